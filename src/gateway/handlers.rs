//! Gateway-level handlers
//!
//! Auth and content handlers live with their modules; this holds the
//! endpoints that belong to the service itself.

pub mod health;

pub use health::{HealthResponse, health_check};
