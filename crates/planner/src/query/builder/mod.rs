pub mod drop_partition;
pub mod insert;
