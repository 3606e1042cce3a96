//! OpenTelemetry Protocol (OTLP) support.
//!
//! This module turns OTLP protobuf bundles into the document models used for storage.
//!
//! - [`attributes`] - typed-value decoding (`AnyValue` to [`AttributeValue`])
//! - [`severity`] - numeric severity code to canonical name
//! - [`classify`] - metric shape detection
//! - [`conversions`] - per-signal bundle conversion
//! - [`payload`] - protobuf and OTLP/JSON request bodies
//!
//! # Example
//!
//! ```
//! use shared::otlp::proto::trace::v1::ResourceSpans;
//! use shared::otlp::conversions::convert_resource_spans;
//!
//! // A bundle with no resource and no scope groupings converts to nothing.
//! let converted = convert_resource_spans(&ResourceSpans::default());
//! assert!(converted.records.is_empty());
//! assert!(converted.rejected.is_empty());
//! ```
//!
//! [`AttributeValue`]: crate::models::AttributeValue

pub mod attributes;
pub mod classify;
pub mod conversions;
pub mod payload;
pub mod severity;

/// Generated OTLP protobuf types and tonic collector services.
pub use opentelemetry_proto::tonic as proto;
