// 🚨 Error Taxonomy - Every failure aborts the run before anything is written

use std::path::PathBuf;

/// Errors raised while preparing or performing a split run.
#[derive(Debug, thiserror::Error)]
pub enum SplitterError {
    /// Malformed or missing configuration value.
    #[error("config error: {0}")]
    Config(String),

    /// A string failed its expected grammar (entity version, category path, template).
    #[error("format error: {what} {value:?}")]
    Format { what: &'static str, value: String },

    /// A category or payee lookup found nothing.
    #[error("not found: {what} {name:?}")]
    NotFound { what: &'static str, name: String },

    /// No usable device descriptor.
    #[error("no device: {0}")]
    NoDevice(String),

    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SplitterError {
    pub fn format(what: &'static str, value: impl Into<String>) -> Self {
        SplitterError::Format {
            what,
            value: value.into(),
        }
    }

    pub fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        SplitterError::NotFound {
            what,
            name: name.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SplitterError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        SplitterError::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SplitterError>;
