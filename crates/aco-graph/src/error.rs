use thiserror::Error;

/// Errors raised while building graphs and paths.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown node `{0}`")]
    UnknownNode(String),

    #[error("no edge between `{from}` and `{to}`")]
    NoEdge { from: String, to: String },

    #[error("duplicate node `{0}`")]
    DuplicateNode(String),

    #[error("duplicate edge between `{0}` and `{1}`")]
    DuplicateEdge(String, String),

    #[error("edge `{from}`-`{to}` has invalid distance {distance}")]
    InvalidDistance { from: String, to: String, distance: f64 },

    #[error("a path needs at least {min} edges, got {got}")]
    PathTooShort { min: usize, got: usize },

    #[error("unknown topology `{0}`")]
    UnknownTopology(String),

    #[error("no route from `{from}` to `{to}`")]
    NoRoute { from: String, to: String },
}

pub type GraphResult<T> = Result<T, GraphError>;
