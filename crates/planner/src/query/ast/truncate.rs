use crate::query::ast::common::TableRef;

#[derive(Debug, Clone, PartialEq)]
pub struct Truncate {
    pub table: TableRef,
}
