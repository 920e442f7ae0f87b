use crate::{error::TransferError, plan::PartitionPlan};
use connectors::sql::base::{
    destination::DbDataDestination,
    error::{DbError, ServerErrorInfo},
};
use serde::Serialize;
use tracing::{error, info};

/// MySQL `ER_DROP_PARTITION_NON_EXISTENT`.
const MYSQL_UNKNOWN_PARTITION: u16 = 1507;
/// PostgreSQL `undefined_table`: the day's child table was never created.
const PG_UNDEFINED_TABLE: &str = "42P01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Expected on a fresh table; log and carry on.
    Tolerable,
    /// Anything else. Still does not stop a partition drop, but is logged as an error.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionDropOutcome {
    Dropped,
    NotFound,
    Failed,
}

pub fn classify_partition_drop_error(err: &DbError) -> ErrorDisposition {
    match err.server_error() {
        Some(info) => classify_server_error(&info),
        None => ErrorDisposition::Fatal,
    }
}

pub fn classify_server_error(info: &ServerErrorInfo) -> ErrorDisposition {
    if info.code == Some(MYSQL_UNKNOWN_PARTITION)
        || (info.code.is_none() && info.sql_state.as_deref() == Some(PG_UNDEFINED_TABLE))
    {
        ErrorDisposition::Tolerable
    } else {
        ErrorDisposition::Fatal
    }
}

/// Pre-transfer maintenance on the target table.
pub struct TablePreparer<'a, D> {
    destination: &'a mut D,
}

impl<'a, D: DbDataDestination> TablePreparer<'a, D> {
    pub fn new(destination: &'a mut D) -> Self {
        Self { destination }
    }

    /// Best-effort: every failure is absorbed, only the log level differs.
    pub async fn drop_partition(
        &mut self,
        partition: &PartitionPlan,
        table: &str,
    ) -> PartitionDropOutcome {
        info!(
            "Dropping partition '{}' for date '{}'...",
            partition.name, partition.date
        );

        match self.destination.execute(&partition.sql).await {
            Ok(()) => {
                info!(
                    "Partition for date '{}' has been successfully dropped.",
                    partition.date
                );
                PartitionDropOutcome::Dropped
            }
            Err(err) => match classify_partition_drop_error(&err) {
                ErrorDisposition::Tolerable => {
                    info!(
                        "Partition for date '{}' does not exist on table '{}'; skipping drop operation.",
                        partition.date, table
                    );
                    PartitionDropOutcome::NotFound
                }
                ErrorDisposition::Fatal => {
                    error!(
                        error = %err,
                        sql = %partition.sql,
                        "Error while dropping partition for date '{}' on table '{}'. Continuing with the transfer.",
                        partition.date, table
                    );
                    PartitionDropOutcome::Failed
                }
            },
        }
    }

    pub async fn truncate(&mut self, sql: &str, table: &str) -> Result<(), TransferError> {
        info!("Truncating target table '{}'...", table);
        self.destination
            .execute(sql)
            .await
            .map_err(|source| TransferError::Truncate {
                table: table.to_string(),
                source,
            })?;
        info!("Table '{}' has been successfully truncated.", table);
        Ok(())
    }
}
