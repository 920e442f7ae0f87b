use crate::{
    error::PlanError,
    query::ast::{common::TableRef, insert::Insert},
};

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    ast: Insert,
}

impl InsertBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: Insert {
                table,
                columns: Vec::new(),
            },
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ast.columns = columns
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .collect();
        self
    }

    pub fn build(self) -> Result<Insert, PlanError> {
        if self.ast.columns.is_empty() {
            return Err(PlanError::NoColumns(self.ast.table.to_string()));
        }
        if let Some(pos) = self.ast.columns.iter().position(|c| c.is_empty()) {
            return Err(PlanError::BlankColumn(pos));
        }
        Ok(self.ast)
    }
}
