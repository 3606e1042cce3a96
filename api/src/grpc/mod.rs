//! OTLP gRPC receiver services.
//!
//! Implements the OpenTelemetry Protocol gRPC collector services on behalf of many
//! organizations. These services work with standard OpenTelemetry SDK exporters; the
//! organization is resolved from each call's metadata.
//!
//! # Services
//!
//! - `LogsService` - Receives logs via gRPC
//! - `MetricsService` - Receives metrics via gRPC
//! - `TraceService` - Receives traces via gRPC

mod authority;
mod services;

pub use authority::{request_authority, AuthorityLayer, AuthorityService};
pub use services::{LogsServiceImpl, MetricsServiceImpl, TracesServiceImpl, ACCEPTED_RECORDS_KEY};
