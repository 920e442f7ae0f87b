use model::records::{batch::Batch, row::Row};
use std::mem;

/// Buffers rows until `capacity` is reached.
///
/// Never flushes on its own: the caller writes the batch when `add` reports
/// it full, and drains whatever remains once the source is exhausted.
#[derive(Debug)]
pub struct BatchAccumulator {
    capacity: usize,
    rows: Vec<Row>,
    next_seq: u64,
}

impl BatchAccumulator {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            rows: Vec::with_capacity(capacity),
            next_seq: 1,
        }
    }

    /// Appends a row. Returns `true` once the batch holds `capacity` rows.
    pub fn add(&mut self, row: Row) -> bool {
        self.rows.push(row);
        self.rows.len() >= self.capacity
    }

    /// Hands the buffered rows over as a new batch and starts a fresh buffer.
    pub fn drain(&mut self) -> Batch {
        let rows = mem::replace(&mut self.rows, Vec::with_capacity(self.capacity));
        let batch = Batch::new(self.next_seq, rows);
        self.next_seq += 1;
        batch
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::Value;

    fn row(i: i64) -> Row {
        Row::new(vec![Value::Int(i)])
    }

    #[test]
    fn test_add_signals_full_at_capacity() {
        let mut acc = BatchAccumulator::new(3);
        assert!(!acc.add(row(1)));
        assert!(!acc.add(row(2)));
        assert!(acc.add(row(3)));
        assert_eq!(acc.len(), 3);
    }

    #[test]
    fn test_drain_resets_and_numbers_batches() {
        let mut acc = BatchAccumulator::new(2);
        acc.add(row(1));
        acc.add(row(2));

        let first = acc.drain();
        assert_eq!(first.seq, 1);
        assert_eq!(first.rows, vec![row(1), row(2)]);
        assert!(acc.is_empty());

        acc.add(row(3));
        let second = acc.drain();
        assert_eq!(second.seq, 2);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut acc = BatchAccumulator::new(0);
        assert_eq!(acc.capacity(), 1);
        assert!(acc.add(row(1)));
    }
}
