use crate::{error::TransferError, metrics::Metrics};
use connectors::sql::base::destination::DbDataDestination;
use model::records::batch::Batch;
use std::time::Instant;
use tracing::debug;

/// Writes batches to the target with an insert template rendered once per run.
pub struct BatchWriter<'a, D> {
    destination: &'a mut D,
    insert_sql: &'a str,
    column_count: usize,
    metrics: Metrics,
    total_rows: u64,
    batches: u64,
}

impl<'a, D: DbDataDestination> BatchWriter<'a, D> {
    pub fn new(
        destination: &'a mut D,
        insert_sql: &'a str,
        column_count: usize,
        metrics: Metrics,
    ) -> Self {
        Self {
            destination,
            insert_sql,
            column_count,
            metrics,
            total_rows: 0,
            batches: 0,
        }
    }

    /// Writes `batch` in one transaction and returns the running row total.
    ///
    /// Every row must carry exactly one value per target column; a mismatch
    /// rejects the whole batch before anything is sent.
    pub async fn write(&mut self, batch: Batch) -> Result<u64, TransferError> {
        if batch.is_empty() {
            return Ok(self.total_rows);
        }

        if let Some((row, values)) = batch
            .rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != self.column_count)
        {
            return Err(TransferError::ColumnCountMismatch {
                batch: batch.seq,
                row,
                expected: self.column_count,
                actual: values.len(),
            });
        }

        let seq = batch.seq;
        let rows = batch.len();
        let bytes = batch.size_bytes() as u64;
        debug!(batch = seq, "Writing a batch of {} rows to the target...", rows);

        let start = Instant::now();
        let affected = self
            .destination
            .write_batch(self.insert_sql, batch.into_rows())
            .await
            .map_err(|source| TransferError::Write {
                batch: seq,
                rows,
                source,
            })?;
        let duration = start.elapsed();

        self.total_rows += rows as u64;
        self.batches += 1;
        self.metrics.increment_rows(rows as u64);
        self.metrics.increment_bytes(bytes);
        self.metrics.increment_batches(1);

        debug!(
            batch = seq,
            rows,
            affected,
            duration_ms = duration.as_millis(),
            "Batch committed"
        );

        Ok(self.total_rows)
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn batches(&self) -> u64 {
        self.batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDestination, rows};

    const INSERT: &str = "INSERT INTO `t` (`a`, `b`) VALUES (?, ?)";

    #[tokio::test]
    async fn test_write_passes_rows_and_template_through() {
        let mut dest = MockDestination::default();
        let metrics = Metrics::new();
        let mut writer = BatchWriter::new(&mut dest, INSERT, 2, metrics.clone());

        let total = writer.write(Batch::new(1, rows(3, 2))).await.unwrap();
        assert_eq!(total, 3);
        let total = writer.write(Batch::new(2, rows(2, 2))).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(writer.batches(), 2);

        assert_eq!(dest.batch_sizes(), vec![3, 2]);
        assert!(dest.insert_sql.iter().all(|sql| sql == INSERT));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.rows_transferred, 5);
        assert_eq!(snapshot.batches_written, 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_not_written() {
        let mut dest = MockDestination::default();
        let mut writer = BatchWriter::new(&mut dest, INSERT, 2, Metrics::new());
        assert_eq!(writer.write(Batch::new(1, Vec::new())).await.unwrap(), 0);
        assert!(dest.writes.is_empty());
    }

    #[tokio::test]
    async fn test_column_count_mismatch_rejects_batch() {
        let mut dest = MockDestination::default();
        let mut writer = BatchWriter::new(&mut dest, INSERT, 3, Metrics::new());
        let err = writer.write(Batch::new(7, rows(2, 2))).await.unwrap_err();
        assert!(matches!(
            err,
            TransferError::ColumnCountMismatch {
                batch: 7,
                row: 0,
                expected: 3,
                actual: 2
            }
        ));
        assert!(dest.writes.is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_names_batch() {
        let mut dest = MockDestination {
            fail_write: Some(1),
            ..Default::default()
        };
        let metrics = Metrics::new();
        let mut writer = BatchWriter::new(&mut dest, INSERT, 2, metrics.clone());
        let err = writer.write(Batch::new(1, rows(4, 2))).await.unwrap_err();
        assert!(matches!(err, TransferError::Write { batch: 1, rows: 4, .. }));
        assert_eq!(writer.total_rows(), 0);
        assert_eq!(metrics.snapshot().rows_transferred, 0);
    }
}
