//! Shared error types for the services crate.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::AreaKey;
use storage::StorageError;

/// Errors emitted by question sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request for {url} failed with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json in {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no such file: {0}")]
    Missing(String),
}

/// What a failed load was for; `retry_load` repeats it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    Catalog,
    Area(AreaKey),
}

impl fmt::Display for LoadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadTarget::Catalog => f.write_str("area catalog"),
            LoadTarget::Area(key) => write!(f, "questions of {key}"),
        }
    }
}

/// A fetch failure kept on the engine as a user-visible indicator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load {target}: {message}")]
pub struct LoadError {
    pub target: LoadTarget,
    pub message: String,
}

/// Errors emitted by `QuizEngine` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no area selected")]
    NoAreaSelected,
    #[error("unknown area: {0}")]
    UnknownArea(AreaKey),
    #[error("no area at position {0}")]
    NoAreaAtPosition(usize),
    #[error("cannot {action} from {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
    #[error("answer does not apply to this question")]
    InvalidAnswer,
    #[error("position {position} is outside the session ({len} questions)")]
    OutOfRange { position: usize, len: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
