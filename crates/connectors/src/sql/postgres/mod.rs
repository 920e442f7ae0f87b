pub mod adapter;
pub mod coercion;
pub mod numeric;
pub mod params;
pub mod row;
pub mod utils;
