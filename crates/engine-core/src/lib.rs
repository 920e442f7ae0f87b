pub mod accumulator;
pub mod error;
pub mod metrics;
pub mod plan;
pub mod preparer;
pub mod report;
pub mod transfer;
pub mod writer;

#[cfg(test)]
pub(crate) mod mock;
