//! Defines the AST for dropping one partition of a partitioned table.

use crate::query::ast::common::TableRef;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct DropPartition {
    pub table: TableRef,
    /// Partition name, already rendered from the processing date.
    pub partition: String,
    /// The processing date the partition name was derived from.
    pub date: NaiveDate,
}
