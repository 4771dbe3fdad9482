use std::path::PathBuf;

use thiserror::Error;

/// Failure of one candidate layout against the loaded model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("feature mismatch: model expects {expected}, got {found}")]
    FeatureMismatch { expected: String, found: String },

    #[error("unsupported input layout: {0}")]
    UnsupportedInput(&'static str),

    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    #[error("model backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no model file found in {0}")]
    NotFound(PathBuf),

    #[error("failed to read model at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model definition: {0}")]
    Invalid(String),

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),
}

/// Boundary failure reported back as `{success: false, error}`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("No input data provided")]
    MissingInput,

    #[error("Invalid value for '{0}': expected a string")]
    InvalidField(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
