//! otelgate Shared Library
//!
//! This crate contains the tenant-aware OTLP ingestion core shared by the
//! otelgate server and command-line tool.
//!
//! # Modules
//!
//! - [`models`] - Tenant identity and storage-ready documents
//! - [`otlp`] - OTLP protobuf types and conversion to documents
//! - [`tenancy`] - Tenant resolution, token lookup and the service registry
//! - [`ingest`] - Per-tenant ingestion handlers
//! - [`storage`] - Storage traits and implementations
//!
//! # Example
//!
//! ```
//! use shared::models::AttributeValue;
//! use shared::otlp::attributes::decode_attributes;
//! use shared::otlp::proto::common::v1::{any_value::Value, AnyValue, KeyValue};
//!
//! let attributes = decode_attributes(&[KeyValue {
//!     key: "int_attr".to_string(),
//!     value: Some(AnyValue { value: Some(Value::IntValue(42)) }),
//! }]);
//!
//! assert_eq!(attributes["int_attr"], AttributeValue::Int(42));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ingest;
pub mod models;
pub mod otlp;
pub mod storage;
pub mod tenancy;

/// Re-export common dependencies for convenience.
pub use serde;
pub use serde_json;
