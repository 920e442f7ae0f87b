use crate::sql::base::error::DbError;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use model::records::row::Row;

/// Forward-only sequence of source rows. Dropping it abandons the read.
pub type RowStream<'a> = BoxStream<'a, Result<Row, DbError>>;

#[async_trait]
pub trait DbDataSource: Send {
    /// Executes `query` once and returns its rows lazily, in result order.
    ///
    /// `fetch_size` is a paging hint: the reader keeps at most about that many
    /// rows buffered client-side. Column count and order come from the result
    /// set itself.
    async fn stream_rows<'a>(
        &'a mut self,
        query: &'a str,
        fetch_size: usize,
    ) -> Result<RowStream<'a>, DbError>;
}
