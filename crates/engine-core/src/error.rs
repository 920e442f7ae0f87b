use connectors::sql::base::error::DbError;
use planner::error::PlanError;
use thiserror::Error;

/// Fatal failures of a transfer run. Partition-drop failures never appear
/// here: they are logged and absorbed by the preparer.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Failed to build statements: {0}")]
    Plan(#[from] PlanError),

    #[error("Failed to truncate target table '{table}': {source}")]
    Truncate {
        table: String,
        #[source]
        source: DbError,
    },

    #[error("Failed to read from source: {0}")]
    Read(#[source] DbError),

    #[error("Failed to write batch {batch} ({rows} rows): {source}")]
    Write {
        batch: u64,
        rows: usize,
        #[source]
        source: DbError,
    },

    /// Row `row` (0-based within the batch) does not match the column list.
    #[error("Row {row} of batch {batch} has {actual} values but {expected} target columns are configured")]
    ColumnCountMismatch {
        batch: u64,
        row: usize,
        expected: usize,
        actual: usize,
    },
}
