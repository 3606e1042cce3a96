//! API route definitions.
//!
//! This module organizes all HTTP routes for the otelgate server.

mod error;
mod health;
mod organizations;
mod telemetry;

pub use error::{ApiError, ErrorBody};
pub use health::health_routes;
pub use organizations::organization_routes;
pub use telemetry::telemetry_routes;
