//! Application services.

pub mod compliance;
pub mod events;
pub mod geospatial;
pub mod providers;
