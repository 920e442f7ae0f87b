use crate::{
    error::PlanError,
    query::ast::{common::TableRef, drop_partition::DropPartition},
};
use chrono::{
    NaiveDate,
    format::{Item, StrftimeItems},
};
use std::fmt::Write;

pub const DEFAULT_PARTITION_NAME_FORMAT: &str = "p%Y%m%d";

#[derive(Debug, Clone)]
pub struct DropPartitionBuilder {
    table: TableRef,
    date: NaiveDate,
    name_format: String,
}

impl DropPartitionBuilder {
    pub fn new(table: TableRef, date: NaiveDate) -> Self {
        Self {
            table,
            date,
            name_format: DEFAULT_PARTITION_NAME_FORMAT.to_string(),
        }
    }

    /// strftime pattern used to turn the processing date into a partition name.
    pub fn name_format(mut self, format: impl Into<String>) -> Self {
        self.name_format = format.into();
        self
    }

    pub fn build(self) -> Result<DropPartition, PlanError> {
        let partition = render_partition_name(&self.name_format, self.date)?;
        Ok(DropPartition {
            table: self.table,
            partition,
            date: self.date,
        })
    }
}

/// Formats `date` with `format`, rejecting patterns chrono cannot render
/// and patterns that render to nothing.
pub fn render_partition_name(format: &str, date: NaiveDate) -> Result<String, PlanError> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(PlanError::InvalidPartitionFormat(format.to_string()));
    }

    let mut name = String::new();
    write!(name, "{}", date.format_with_items(items.into_iter()))
        .map_err(|_| PlanError::InvalidPartitionFormat(format.to_string()))?;

    if name.trim().is_empty() {
        return Err(PlanError::InvalidPartitionFormat(format.to_string()));
    }
    Ok(name)
}
