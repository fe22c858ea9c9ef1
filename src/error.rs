use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CocoSplitError>;

#[derive(Debug, Error)]
pub enum CocoSplitError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("train ratio must be strictly between 0 and 1, got {0}")]
    InvalidRatio(f64),
    #[error("annotation {annotation_id} references unknown category {category_id}")]
    DanglingCategory { annotation_id: u64, category_id: u64 },
}

impl CocoSplitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
