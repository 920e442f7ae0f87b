use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("INSERT for table '{0}' has no columns")]
    NoColumns(String),

    #[error("Blank column name at position {0}")]
    BlankColumn(usize),

    #[error("Invalid partition name format '{0}'")]
    InvalidPartitionFormat(String),
}
