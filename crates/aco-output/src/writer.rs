//! The `OutputWriter` trait implemented by backend writers.

use crate::{CycleSummaryRow, OutputResult, PheromoneRow};

/// Trait implemented by output backends.
///
/// Errors never reach the colony: the observer stores the first one in its
/// [`ErrorSlot`][crate::ErrorSlot].
pub trait OutputWriter: Send {
    fn write_cycle_summary(&mut self, row: &CycleSummaryRow) -> OutputResult<()>;

    /// Write one cycle's pheromone levels, one row per edge.
    fn write_pheromones(&mut self, rows: &[PheromoneRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
