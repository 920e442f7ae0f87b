//! Defines the AST for the INSERT template used by the batch writer.

use crate::query::ast::common::TableRef;

/// A single-row INSERT with one positional placeholder per column.
///
/// The rendered text is executed once per row of a batch, so the statement
/// never carries values itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
}
