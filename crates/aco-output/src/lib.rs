//! `aco-output` — colony output writers.
//!
//! | Backend | Files created                                      |
//! |---------|----------------------------------------------------|
//! | CSV     | `cycle_summaries.csv`, `pheromone_levels.csv`      |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`ColonyOutputObserver`], which implements `aco_sim::ColonyObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use aco_output::{ColonyOutputObserver, CsvWriter};
//!
//! let observer = ColonyOutputObserver::new(CsvWriter::new(Path::new("./output"))?);
//! let errors = observer.errors();
//! let colony = ColonyBuilder::new(config).observer(observer).build()?;
//! // ... run ...
//! if let Some(e) = errors.take() { eprintln!("output error: {e}"); }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{ErrorSlot, OutputError, OutputResult};
pub use observer::ColonyOutputObserver;
pub use row::{CycleSummaryRow, PheromoneRow};
pub use writer::OutputWriter;
