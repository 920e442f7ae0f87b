use crate::sql::{
    base::{
        adapter::{ConnectOptions, DatabaseKind, SqlAdapter},
        destination::DbDataDestination,
        error::{ConnectorError, DbError},
        source::{DbDataSource, RowStream},
    },
    postgres::{
        params::PgParamStore,
        row::{convert_row, with_text_fallback},
        utils::{connect_client, strip_statement_terminator},
    },
};
use async_trait::async_trait;
use futures_util::{StreamExt, future::try_join_all, stream};
use model::records::row::Row;
use std::collections::VecDeque;
use tokio_postgres::{Client, Row as PgRow, Statement};
use tracing::{debug, trace, warn};

const CURSOR_NAME: &str = "db_transfer_cursor";

pub struct PgAdapter {
    client: Client,
    /// Insert statement prepared on first use, keyed by its SQL text.
    insert: Option<(String, Statement)>,
}

impl PgAdapter {
    /// Builds the cursor query, casting columns the reader has no decoder for
    /// to text on the server.
    async fn cursor_query(&self, query: &str) -> Result<String, DbError> {
        let query = strip_statement_terminator(query);
        let described = self.client.prepare(query).await?;
        let types: Vec<_> = described
            .columns()
            .iter()
            .map(|column| column.type_().clone())
            .collect();

        match with_text_fallback(query, &types) {
            Some(wrapped) => {
                debug!(sql = %wrapped, "Reading unsupported column types as text");
                Ok(wrapped)
            }
            None => Ok(query.to_string()),
        }
    }

    async fn prepared(&mut self, sql: &str) -> Result<Statement, DbError> {
        if let Some((cached, statement)) = &self.insert {
            if cached == sql {
                return Ok(statement.clone());
            }
        }

        let statement = self.client.prepare(sql).await?;
        debug!(params = statement.params().len(), "Prepared insert statement");
        self.insert = Some((sql.to_string(), statement.clone()));
        Ok(statement)
    }
}

#[async_trait]
impl SqlAdapter for PgAdapter {
    async fn connect(options: &ConnectOptions) -> Result<Self, ConnectorError> {
        let client = connect_client(options).await?;
        Ok(PgAdapter {
            client,
            insert: None,
        })
    }

    async fn exec(&mut self, sql: &str) -> Result<(), DbError> {
        debug!(sql, "Executing statement");
        self.client.batch_execute(sql).await?;
        Ok(())
    }

    async fn ping(&mut self) -> Result<(), DbError> {
        self.client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }
}

/// Paging state of an open server-side cursor.
struct CursorState<'a> {
    client: &'a Client,
    fetch_sql: String,
    fetch_size: usize,
    buffer: VecDeque<PgRow>,
    exhausted: bool,
}

async fn next_row(mut state: CursorState<'_>) -> Result<Option<(Row, CursorState<'_>)>, DbError> {
    loop {
        if let Some(row) = state.buffer.pop_front() {
            let row = convert_row(&row)?;
            return Ok(Some((row, state)));
        }

        if state.exhausted {
            state
                .client
                .batch_execute(&format!("CLOSE {CURSOR_NAME}; COMMIT"))
                .await?;
            debug!("Source cursor closed");
            return Ok(None);
        }

        let page = state.client.query(&state.fetch_sql, &[]).await?;
        trace!(rows = page.len(), "Fetched cursor page");
        if page.len() < state.fetch_size {
            state.exhausted = true;
        }
        state.buffer.extend(page);
    }
}

#[async_trait]
impl DbDataSource for PgAdapter {
    async fn stream_rows<'a>(
        &'a mut self,
        query: &'a str,
        fetch_size: usize,
    ) -> Result<RowStream<'a>, DbError> {
        let fetch_size = fetch_size.max(1);
        let client: &'a Client = &self.client;

        client.batch_execute("START TRANSACTION READ ONLY").await?;
        let declared = match self.cursor_query(query).await {
            Ok(cursor_query) => client
                .batch_execute(&format!(
                    "DECLARE {CURSOR_NAME} NO SCROLL CURSOR FOR {cursor_query}"
                ))
                .await
                .map_err(DbError::from),
            Err(err) => Err(err),
        };
        if let Err(err) = declared {
            if let Err(rollback) = client.batch_execute("ROLLBACK").await {
                warn!(%rollback, "Failed to roll back source transaction");
            }
            return Err(err);
        }
        debug!(fetch_size, "Declared source cursor");

        let state = CursorState {
            client,
            fetch_sql: format!("FETCH FORWARD {fetch_size} FROM {CURSOR_NAME}"),
            fetch_size,
            buffer: VecDeque::with_capacity(fetch_size),
            exhausted: false,
        };

        Ok(stream::try_unfold(state, next_row).boxed())
    }
}

#[async_trait]
impl DbDataDestination for PgAdapter {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }

    async fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        self.exec(sql).await
    }

    async fn write_batch(&mut self, insert_sql: &str, rows: Vec<Row>) -> Result<u64, DbError> {
        let statement = self.prepared(insert_sql).await?;
        let stores = rows
            .into_iter()
            .map(|row| PgParamStore::from_values(row.into_values(), statement.params()))
            .collect::<Result<Vec<_>, _>>()?;
        let params: Vec<_> = stores.iter().map(PgParamStore::as_refs).collect();

        // Dropping the transaction without commit rolls the whole batch back.
        let tx = self.client.transaction().await?;
        // Executions are pipelined on the connection and applied in order.
        let counts = try_join_all(params.iter().map(|p| tx.execute(&statement, p))).await?;
        tx.commit().await?;

        Ok(counts.iter().sum())
    }
}
