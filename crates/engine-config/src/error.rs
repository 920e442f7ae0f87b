use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating the transfer configuration.
///
/// All of them are detected before any database connection is opened.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `${NAME}` reference with no value in the environment or env file.
    #[error("Environment variable '{name}' referenced in '{field}' is not set")]
    MissingEnvVar { name: String, field: String },

    #[error("Unterminated '${{' in '{field}'")]
    UnterminatedPlaceholder { field: String },

    #[error("Invalid env file {path}: {message} at line {line}")]
    EnvFile {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
