use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Failures at the fallible edges: config files, exclude patterns, the
/// project root and the written document. Traversal and metadata lookup
/// degrade instead of returning these.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Could not parse config TOML: {0}")]
    TomlParse(String),

    #[error("Could not render config TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Bad exclude pattern: {0}")]
    Glob(String),

    #[error("Unusable project root: {0}")]
    InvalidRoot(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<globset::Error> for AppError {
    fn from(err: globset::Error) -> Self {
        AppError::Glob(err.to_string())
    }
}
