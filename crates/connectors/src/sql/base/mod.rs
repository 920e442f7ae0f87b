pub mod adapter;
pub mod destination;
pub mod error;
pub mod source;
