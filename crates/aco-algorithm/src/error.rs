use aco_core::EdgeId;
use aco_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlgoError {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] GraphError),

    #[error("no solution path found yet")]
    NotFound,

    #[error("unknown algorithm `{0}`")]
    UnknownAlgorithm(String),

    #[error("unknown edge {0}")]
    UnknownEdge(EdgeId),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type AlgoResult<T> = Result<T, AlgoError>;
