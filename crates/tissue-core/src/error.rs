//! Error Types
//!
//! Failures surfaced by configuration loading and by the seeding pass.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating the TOML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Errors that abort a seeding pass.
///
/// Every variant is fatal for the pass: agents created earlier in the same
/// pass are removed before the error is returned.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("malformed layout record at line {line}: {content:?}")]
    MalformedRecord { line: usize, content: String },
    #[error("unknown cell type tag {tag} in record {record}")]
    TypeResolution { tag: i64, record: usize },
    #[error("invalid sampling bounds: lower {lower} > upper {upper}")]
    InvalidSamplingBounds { lower: f64, upper: f64 },
    #[error("invalid standard deviation {0}")]
    InvalidStdDev(f64),
    #[error("failed to read layout {path:?}: {source}")]
    LayoutIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
