use crate::records::row::Row;

/// A group of rows handed to the target in one write.
///
/// `seq` is the 1-based position of the batch within a run and is only used
/// for logging and error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub seq: u64,
    pub rows: Vec<Row>,
}

impl Batch {
    pub fn new(seq: u64, rows: Vec<Row>) -> Self {
        Batch { seq, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        self.rows.iter().map(|r| r.size_bytes()).sum()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}
