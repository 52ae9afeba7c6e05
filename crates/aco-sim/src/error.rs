use aco_algorithm::AlgoError;
use aco_core::{AcoError, WorkerId};
use aco_graph::GraphError;
use aco_sync::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] AcoError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("algorithm error: {0}")]
    Algorithm(#[from] AlgoError),

    #[error("coordination error: {0}")]
    Sync(#[from] SyncError),

    #[error("protocol violation by {worker}: {reason}")]
    Protocol { worker: WorkerId, reason: String },
}

impl SimError {
    pub(crate) fn protocol(worker: &WorkerId, reason: impl Into<String>) -> Self {
        SimError::Protocol { worker: worker.clone(), reason: reason.into() }
    }
}

pub type SimResult<T> = Result<T, SimError>;
