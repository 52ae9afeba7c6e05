//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `cycle_summaries.csv`
//! - `pheromone_levels.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{CycleSummaryRow, OutputResult, PheromoneRow};

pub const CYCLE_SUMMARY_HEADER: [&str; 6] =
    ["cycle", "tick", "population", "best_distance", "best_path", "termination"];
pub const PHEROMONE_HEADER: [&str; 5] = ["cycle", "from", "to", "distance", "pheromone"];

/// Writes colony output to two CSV files.
pub struct CsvWriter {
    summaries:  Writer<File>,
    pheromones: Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut summaries = Writer::from_path(dir.join("cycle_summaries.csv"))?;
        summaries.write_record(CYCLE_SUMMARY_HEADER)?;

        let mut pheromones = Writer::from_path(dir.join("pheromone_levels.csv"))?;
        pheromones.write_record(PHEROMONE_HEADER)?;

        Ok(Self { summaries, pheromones, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_cycle_summary(&mut self, row: &CycleSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.cycle.to_string(),
            row.tick.to_string(),
            row.population.to_string(),
            row.best_distance.map(|d| d.to_string()).unwrap_or_default(),
            row.best_path.clone().unwrap_or_default(),
            row.termination.clone().unwrap_or_default(),
        ])?;
        Ok(())
    }

    fn write_pheromones(&mut self, rows: &[PheromoneRow]) -> OutputResult<()> {
        for row in rows {
            self.pheromones.write_record(&[
                row.cycle.to_string(),
                row.from.clone(),
                row.to.clone(),
                row.distance.to_string(),
                row.pheromone.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.summaries.flush()?;
        self.pheromones.flush()?;
        Ok(())
    }
}
