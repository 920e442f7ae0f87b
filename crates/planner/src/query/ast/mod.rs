pub mod common;
pub mod drop_partition;
pub mod insert;
pub mod truncate;
