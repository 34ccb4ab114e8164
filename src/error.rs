//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelmakerError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no config source named '{0}'")]
    UnknownSource(String),

    #[error("no rules defined for class '{0}'")]
    UnknownClass(String),

    #[error("rule index {index} out of range for class '{class}' ({len} rules)")]
    RuleIndex {
        class: String,
        index: usize,
        len: usize,
    },

    #[error("malformed version string '{0}'")]
    Version(String),
}

pub type Result<T> = std::result::Result<T, LabelmakerError>;

impl LabelmakerError {
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
