use async_trait::async_trait;
use connectors::sql::base::{
    adapter::DatabaseKind,
    destination::DbDataDestination,
    error::DbError,
    source::{DbDataSource, RowStream},
};
use futures::{StreamExt, stream};
use model::{core::value::Value, records::row::Row};

pub(crate) fn mysql_server_error(code: u16, state: &str) -> DbError {
    DbError::MySqlError(mysql_async::Error::Server(mysql_async::ServerError {
        code,
        message: format!("server error {code}"),
        state: state.to_string(),
    }))
}

pub(crate) fn rows(n: usize, width: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            (0..width)
                .map(|c| Value::Int((i * width + c) as i64))
                .collect::<Row>()
        })
        .collect()
}

/// Yields `rows`, optionally failing instead of yielding row `fail_at`.
#[derive(Default)]
pub(crate) struct MockSource {
    pub rows: Vec<Row>,
    pub fail_at: Option<usize>,
    pub opened: bool,
    pub fetch_size: Option<usize>,
    pub query: Option<String>,
}

#[async_trait]
impl DbDataSource for MockSource {
    async fn stream_rows<'a>(
        &'a mut self,
        query: &'a str,
        fetch_size: usize,
    ) -> Result<RowStream<'a>, DbError> {
        self.opened = true;
        self.fetch_size = Some(fetch_size);
        self.query = Some(query.to_string());

        let fail_at = self.fail_at;
        let items = self
            .rows
            .clone()
            .into_iter()
            .enumerate()
            .map(move |(i, row)| match fail_at {
                Some(at) if at == i => Err(DbError::Unknown("connection reset".into())),
                _ => Ok(row),
            })
            .take(fail_at.map_or(usize::MAX, |at| at + 1));
        Ok(stream::iter(items).boxed())
    }
}

/// Records every statement and batch; can be told to fail one statement
/// (matched by prefix) or the n-th batch write (1-based).
pub(crate) struct MockDestination {
    pub kind: DatabaseKind,
    pub executed: Vec<String>,
    pub writes: Vec<Vec<Row>>,
    pub insert_sql: Vec<String>,
    pub fail_execute: Option<(&'static str, fn() -> DbError)>,
    pub fail_write: Option<usize>,
}

impl Default for MockDestination {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::MySql,
            executed: Vec::new(),
            writes: Vec::new(),
            insert_sql: Vec::new(),
            fail_execute: None,
            fail_write: None,
        }
    }
}

impl MockDestination {
    pub fn failing_execute(mut self, prefix: &'static str, make_err: fn() -> DbError) -> Self {
        self.fail_execute = Some((prefix, make_err));
        self
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.writes.iter().map(Vec::len).collect()
    }

    pub fn written_rows(&self) -> Vec<Row> {
        self.writes.iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl DbDataDestination for MockDestination {
    fn kind(&self) -> DatabaseKind {
        self.kind
    }

    async fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        if let Some((prefix, make_err)) = self.fail_execute {
            if sql.starts_with(prefix) {
                return Err(make_err());
            }
        }
        self.executed.push(sql.to_string());
        Ok(())
    }

    async fn write_batch(&mut self, insert_sql: &str, rows: Vec<Row>) -> Result<u64, DbError> {
        if self.fail_write == Some(self.writes.len() + 1) {
            return Err(DbError::Unknown("duplicate key value".into()));
        }
        let count = rows.len() as u64;
        self.insert_sql.push(insert_sql.to_string());
        self.writes.push(rows);
        Ok(count)
    }
}
