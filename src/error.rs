use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KonfigError {
    #[error("Config target must be a struct or map, not a scalar or sequence")]
    NotARecord,

    #[error("Failed to snapshot config target: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode {path} as {format}: {reason}")]
    Decode {
        path: PathBuf,
        format: &'static str,
        reason: String,
    },

    #[error("Cannot set {key}: unsupported kind {kind}")]
    UnsupportedKind { key: String, kind: &'static str },

    #[error("Invalid value for {key}: {reason}")]
    InvalidEnv { key: String, reason: String },

    #[error("No configuration sources found")]
    NoSources,
}

impl KonfigError {
    /// True when the call succeeded at every step but nothing populated the record.
    pub fn is_no_sources(&self) -> bool {
        matches!(self, KonfigError::NoSources)
    }
}
