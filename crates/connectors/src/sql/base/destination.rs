use crate::sql::base::{adapter::DatabaseKind, error::DbError};
use async_trait::async_trait;
use model::records::row::Row;

#[async_trait]
pub trait DbDataDestination: Send {
    fn kind(&self) -> DatabaseKind;

    /// Runs a maintenance statement (TRUNCATE, partition drop).
    async fn execute(&mut self, sql: &str) -> Result<(), DbError>;

    /// Executes `insert_sql` once per row inside a single transaction.
    ///
    /// Either every row is committed or none is. Returns the number of rows
    /// written.
    async fn write_batch(&mut self, insert_sql: &str, rows: Vec<Row>) -> Result<u64, DbError>;
}
