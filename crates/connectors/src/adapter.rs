use crate::{
    error::AdapterError,
    sql::{
        base::{
            adapter::{ConnectOptions, DatabaseKind, SqlAdapter},
            destination::DbDataDestination,
            error::DbError,
            source::{DbDataSource, RowStream},
        },
        mysql::adapter::MySqlAdapter,
        postgres::adapter::PgAdapter,
    },
};
use async_trait::async_trait;
use model::records::row::Row;
use tracing::{info, warn};

/// A live connection to one of the supported databases.
pub enum Adapter {
    MySql(MySqlAdapter),
    Postgres(PgAdapter),
}

impl Adapter {
    pub async fn connect(kind: DatabaseKind, options: &ConnectOptions) -> Result<Self, AdapterError> {
        let adapter = match kind {
            DatabaseKind::MySql => Adapter::MySql(MySqlAdapter::connect(options).await?),
            DatabaseKind::Postgres => Adapter::Postgres(PgAdapter::connect(options).await?),
        };
        info!(%kind, "Connected");
        Ok(adapter)
    }

    pub fn get_sql(&mut self) -> &mut (dyn SqlAdapter + Send) {
        match self {
            Adapter::MySql(adapter) => adapter,
            Adapter::Postgres(adapter) => adapter,
        }
    }

    pub async fn ping(&mut self) -> Result<(), AdapterError> {
        self.get_sql().ping().await?;
        Ok(())
    }

    /// Releases the connection. Errors are logged, not returned: by the time a
    /// connection is closed its work is either committed or abandoned.
    pub async fn close(self) {
        match self {
            Adapter::MySql(adapter) => {
                if let Err(err) = adapter.disconnect().await {
                    warn!(%err, "MySQL disconnect failed");
                }
            }
            // The connection task ends once the client is dropped.
            Adapter::Postgres(adapter) => drop(adapter),
        }
    }
}

#[async_trait]
impl DbDataSource for Adapter {
    async fn stream_rows<'a>(
        &'a mut self,
        query: &'a str,
        fetch_size: usize,
    ) -> Result<RowStream<'a>, DbError> {
        match self {
            Adapter::MySql(adapter) => adapter.stream_rows(query, fetch_size).await,
            Adapter::Postgres(adapter) => adapter.stream_rows(query, fetch_size).await,
        }
    }
}

#[async_trait]
impl DbDataDestination for Adapter {
    fn kind(&self) -> DatabaseKind {
        match self {
            Adapter::MySql(adapter) => DbDataDestination::kind(adapter),
            Adapter::Postgres(adapter) => DbDataDestination::kind(adapter),
        }
    }

    async fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        match self {
            Adapter::MySql(adapter) => adapter.execute(sql).await,
            Adapter::Postgres(adapter) => adapter.execute(sql).await,
        }
    }

    async fn write_batch(&mut self, insert_sql: &str, rows: Vec<Row>) -> Result<u64, DbError> {
        match self {
            Adapter::MySql(adapter) => adapter.write_batch(insert_sql, rows).await,
            Adapter::Postgres(adapter) => adapter.write_batch(insert_sql, rows).await,
        }
    }
}
