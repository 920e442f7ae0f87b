use crate::sql::{
    base::{
        adapter::{ConnectOptions, DatabaseKind, SqlAdapter},
        destination::DbDataDestination,
        error::{ConnectorError, DbError},
        source::{DbDataSource, RowStream},
    },
    mysql::{params::MySqlParamStore, row::convert_row},
};
use async_trait::async_trait;
use futures_util::StreamExt;
use model::records::row::Row;
use mysql_async::{Conn, Opts, OptsBuilder, TxOpts, prelude::*};
use tracing::debug;

pub struct MySqlAdapter {
    conn: Conn,
}

impl MySqlAdapter {
    pub async fn disconnect(self) -> Result<(), DbError> {
        self.conn.disconnect().await?;
        Ok(())
    }
}

/// Parses the URL and lays explicit credentials over the ones it carries.
pub(crate) fn build_opts(options: &ConnectOptions) -> Result<Opts, ConnectorError> {
    let opts =
        Opts::from_url(&options.url).map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;
    let mut builder = OptsBuilder::from_opts(opts);
    if let Some(user) = &options.username {
        builder = builder.user(Some(user.clone()));
    }
    if let Some(password) = &options.password {
        builder = builder.pass(Some(password.clone()));
    }
    Ok(builder.into())
}

#[async_trait]
impl SqlAdapter for MySqlAdapter {
    async fn connect(options: &ConnectOptions) -> Result<Self, ConnectorError> {
        let conn = Conn::new(build_opts(options)?).await?;
        Ok(MySqlAdapter { conn })
    }

    async fn exec(&mut self, sql: &str) -> Result<(), DbError> {
        debug!(sql, "Executing statement");
        self.conn.query_drop(sql).await?;
        Ok(())
    }

    async fn ping(&mut self) -> Result<(), DbError> {
        self.conn.query_drop("SELECT 1").await?;
        Ok(())
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::MySql
    }
}

#[async_trait]
impl DbDataSource for MySqlAdapter {
    async fn stream_rows<'a>(
        &'a mut self,
        query: &'a str,
        fetch_size: usize,
    ) -> Result<RowStream<'a>, DbError> {
        // The binary protocol streams rows off the socket as they are polled,
        // so there is no client-side page to size.
        debug!(fetch_size, "Streaming MySQL result set, fetch size hint not used");
        let rows = self
            .conn
            .exec_stream::<mysql_async::Row, _, _>(query, ())
            .await?;

        Ok(rows
            .map(|row| row.map_err(DbError::from).and_then(convert_row))
            .boxed())
    }
}

#[async_trait]
impl DbDataDestination for MySqlAdapter {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::MySql
    }

    async fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        self.exec(sql).await
    }

    async fn write_batch(&mut self, insert_sql: &str, rows: Vec<Row>) -> Result<u64, DbError> {
        let count = rows.len() as u64;

        // Dropping the transaction without commit rolls the whole batch back.
        let mut tx = self.conn.start_transaction(TxOpts::default()).await?;
        let statement = tx.prep(insert_sql).await?;
        let expected = statement.num_params() as usize;

        let mut params = Vec::with_capacity(rows.len());
        for row in rows {
            let store = MySqlParamStore::from_values(row.into_values());
            if store.len() != expected {
                return Err(DbError::ParameterCount {
                    expected,
                    actual: store.len(),
                });
            }
            params.push(store.into_params());
        }

        tx.exec_batch(statement, params).await?;
        tx.commit().await?;

        Ok(count)
    }
}
