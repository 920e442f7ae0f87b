use crate::exit::ExitCode;
use connectors::error::AdapterError;
use engine_config::error::ConfigError;
use engine_core::error::TransferError;
use planner::error::PlanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build statements: {0}")]
    Plan(#[from] PlanError),

    #[error("Connection failed: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Data transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Config(_)
            | CliError::Plan(_)
            | CliError::Transfer(TransferError::Plan(_)) => ExitCode::ConfigError,
            _ => ExitCode::GeneralError,
        }
    }
}
