//! Checks run on a parsed configuration before any connection is opened.

use crate::{error::ConfigError, settings::DataTransferConfig};
use chrono::NaiveDate;
use planner::query::{
    ast::common::TableRef,
    builder::{drop_partition::render_partition_name, insert::InsertBuilder},
};
use std::collections::HashSet;

pub fn validate(config: &DataTransferConfig) -> Result<(), ConfigError> {
    for (side, settings) in [("source_db", &config.source_db), ("target_db", &config.target_db)] {
        if settings.url.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{side}.url is required")));
        }
        settings
            .kind()
            .map_err(|e| ConfigError::Invalid(format!("{side}: {e}")))?;
    }

    let transfer = &config.transfer;
    if transfer.select_query.trim().is_empty() {
        return Err(ConfigError::Invalid("transfer.select_query is required".into()));
    }
    if transfer.target_table.trim().is_empty() {
        return Err(ConfigError::Invalid("transfer.target_table is required".into()));
    }

    InsertBuilder::new(TableRef::parse(&transfer.target_table))
        .columns(&transfer.target_columns)
        .build()
        .map_err(|e| ConfigError::Invalid(format!("transfer.target_columns: {e}")))?;

    let mut seen = HashSet::new();
    for column in &transfer.target_columns {
        if !seen.insert(column.trim()) {
            return Err(ConfigError::Invalid(format!(
                "transfer.target_columns: duplicate column '{}'",
                column.trim()
            )));
        }
    }

    if transfer.commit_size == 0 {
        return Err(ConfigError::Invalid(
            "transfer.commit_size must be at least 1".into(),
        ));
    }
    if transfer.fetch_size == 0 {
        return Err(ConfigError::Invalid(
            "transfer.fetch_size must be at least 1".into(),
        ));
    }

    if transfer.drop_partition_before_insert {
        // Any date will do; only the pattern is being checked.
        let sample = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
        render_partition_name(&transfer.partition_name_format, sample)
            .map_err(|e| ConfigError::Invalid(format!("transfer.partition_name_format: {e}")))?;
    }

    Ok(())
}
