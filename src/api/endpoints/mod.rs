//! API endpoint handlers.
//!
//! `resources` serves plain CRUD for every entity type; the other modules
//! hold the routes that do more than that.

pub mod dashboard;
pub mod dose_records;
pub mod health;
pub mod health_metrics;
pub mod resources;
pub mod users;
