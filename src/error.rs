use crate::model::Index;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    #[error("invalid event at index {index}: {reason}")]
    Invalid { index: Index, reason: String },
}

pub type ReplayResult<T = ()> = Result<T, ReplayError>;
