use crate::{
    accumulator::BatchAccumulator,
    error::TransferError,
    metrics::Metrics,
    plan::TransferPlan,
    preparer::{PartitionDropOutcome, TablePreparer},
    report::TransferReport,
    writer::BatchWriter,
};
use chrono::{NaiveDate, Utc};
use connectors::sql::base::{destination::DbDataDestination, source::DbDataSource};
use engine_config::settings::transfer::TransferSettings;
use futures::TryStreamExt;
use serde::Serialize;
use std::{fmt, time::Instant};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStage {
    Start,
    PreparePartition,
    PrepareTruncate,
    Transfer,
    Flush,
    Done,
    Failed,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferStage::Start => "start",
            TransferStage::PreparePartition => "prepare_partition",
            TransferStage::PrepareTruncate => "prepare_truncate",
            TransferStage::Transfer => "transfer",
            TransferStage::Flush => "flush",
            TransferStage::Done => "done",
            TransferStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
struct Preparation {
    truncated: bool,
    partition_drop: Option<PartitionDropOutcome>,
}

/// One run of the batch job: prepare the target, stream the source through
/// the accumulator into the writer, flush the remainder.
///
/// Reading and writing are strictly sequential; the source is not polled
/// while a batch is being written.
pub struct TransferJob<'a, S, D> {
    source: &'a mut S,
    destination: &'a mut D,
    settings: &'a TransferSettings,
    plan: TransferPlan,
    metrics: Metrics,
    stage: TransferStage,
}

impl<'a, S, D> TransferJob<'a, S, D>
where
    S: DbDataSource,
    D: DbDataDestination,
{
    /// Renders every target statement for the destination's dialect.
    /// `processing_date` selects the partition to drop.
    pub fn new(
        source: &'a mut S,
        destination: &'a mut D,
        settings: &'a TransferSettings,
        processing_date: NaiveDate,
    ) -> Result<Self, TransferError> {
        let plan = TransferPlan::build(settings, destination.kind().dialect(), processing_date)?;
        Ok(Self {
            source,
            destination,
            settings,
            plan,
            metrics: Metrics::new(),
            stage: TransferStage::Start,
        })
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn plan(&self) -> &TransferPlan {
        &self.plan
    }

    pub fn stage(&self) -> TransferStage {
        self.stage
    }

    pub async fn run(mut self) -> Result<TransferReport, TransferError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        info!("Data transfer process started.");

        match self.execute().await {
            Ok(preparation) => {
                advance(&mut self.stage, TransferStage::Done);

                let mut report =
                    TransferReport::new(self.metrics.snapshot(), started_at, clock.elapsed());
                report.truncated = preparation.truncated;
                report.partition_drop = preparation.partition_drop;

                info!("===============================================================");
                info!("DATA TRANSFER COMPLETED SUCCESSFULLY!");
                info!("Total rows transferred: {}", report.total_rows);
                info!("Total execution time: {} seconds", report.elapsed_secs());
                info!("===============================================================");

                Ok(report)
            }
            Err(err) => {
                let failed_in = self.stage;
                advance(&mut self.stage, TransferStage::Failed);
                self.metrics.increment_failures(1);

                error!(
                    stage = %failed_in,
                    rows_committed = self.metrics.snapshot().rows_transferred,
                    error = %err,
                    "A critical error occurred during the data transfer process!"
                );
                Err(err)
            }
        }
    }

    async fn execute(&mut self) -> Result<Preparation, TransferError> {
        let Self {
            source,
            destination,
            settings,
            plan,
            metrics,
            stage,
        } = self;
        let mut preparation = Preparation::default();

        if let Some(partition) = &plan.partition {
            advance(stage, TransferStage::PreparePartition);
            let outcome = TablePreparer::new(&mut **destination)
                .drop_partition(partition, &plan.target_table)
                .await;
            preparation.partition_drop = Some(outcome);
        }

        if let Some(sql) = &plan.truncate_sql {
            advance(stage, TransferStage::PrepareTruncate);
            TablePreparer::new(&mut **destination)
                .truncate(sql, &plan.target_table)
                .await?;
            preparation.truncated = true;
        }

        advance(stage, TransferStage::Transfer);
        debug!("Generated INSERT query: {}", plan.insert_sql);
        info!(
            "Starting data extraction from source... Fetch Size: {}, Commit Size: {}",
            settings.fetch_size, settings.commit_size
        );

        let mut accumulator = BatchAccumulator::new(settings.commit_size);
        let mut writer = BatchWriter::new(
            &mut **destination,
            &plan.insert_sql,
            plan.column_count,
            metrics.clone(),
        );

        let mut rows = source
            .stream_rows(&settings.select_query, settings.fetch_size)
            .await
            .map_err(TransferError::Read)?;

        while let Some(row) = rows.try_next().await.map_err(TransferError::Read)? {
            if accumulator.add(row) {
                let total = writer.write(accumulator.drain()).await?;
                info!("{} total rows transferred so far...", total);
            }
        }
        drop(rows);

        advance(stage, TransferStage::Flush);
        if !accumulator.is_empty() {
            let batch = accumulator.drain();
            let size = batch.len();
            let total = writer.write(batch).await?;
            info!(
                "Flushing the final batch of {} rows. Grand total: {}",
                size, total
            );
        }

        Ok(preparation)
    }
}

fn advance(stage: &mut TransferStage, next: TransferStage) {
    debug!(from = %stage, to = %next, "Transfer stage changed");
    *stage = next;
}
