//! `ColonyOutputObserver<W>`: bridges `ColonyObserver` to an `OutputWriter`.

use aco_algorithm::TerminationReason;
use aco_sim::{ColonyObserver, CycleReport};
use tracing::warn;

use crate::row::{CycleSummaryRow, PheromoneRow};
use crate::writer::OutputWriter;
use crate::{ErrorSlot, OutputResult};

/// A [`ColonyObserver`] that writes one summary row and one pheromone row
/// per edge at every cycle boundary.
///
/// Errors from the writer are stored because observer methods have no return
/// value.  Take an [`errors`](Self::errors) handle before moving the observer
/// into the colony.
pub struct ColonyOutputObserver<W: OutputWriter> {
    writer: W,
    errors: ErrorSlot,
}

impl<W: OutputWriter> ColonyOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, errors: ErrorSlot::default() }
    }

    /// Handle to the first write error, readable after the run.
    pub fn errors(&self) -> ErrorSlot {
        self.errors.clone()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            warn!(error = %e, "colony output write failed");
            self.errors.store(e);
        }
    }
}

impl<W: OutputWriter> ColonyObserver for ColonyOutputObserver<W> {
    fn on_cycle_end(&mut self, report: &CycleReport<'_>) {
        let summary = CycleSummaryRow {
            cycle:         report.cycle.0,
            tick:          report.tick.0,
            population:    report.population as u64,
            best_distance: report.best.map(|p| p.total_distance()),
            best_path:     report.best.map(|p| p.label().to_owned()),
            termination:   report.termination.map(|r| r.to_string()),
        };
        let result = self.writer.write_cycle_summary(&summary);
        self.store_err(result);

        let graph = report.graph;
        let rows: Vec<PheromoneRow> = graph
            .edge_ids()
            .map(|id| {
                let edge = graph.edge(id);
                let (a, b) = edge.endpoints();
                PheromoneRow {
                    cycle:     report.cycle.0,
                    from:      graph.node_name(a).to_owned(),
                    to:        graph.node_name(b).to_owned(),
                    distance:  edge.distance(),
                    pheromone: edge.pheromone(),
                }
            })
            .collect();
        if !rows.is_empty() {
            let result = self.writer.write_pheromones(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _termination: Option<TerminationReason>) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
