//! Document models for the otelgate ingestion gateway.
//!
//! This module contains the tenant identity types and the normalized, storage-ready
//! records produced from OTLP spans, metric points and log records.

pub mod attribute;
pub mod log;
pub mod metric;
pub mod tenant;
pub mod trace;

pub use attribute::{AttributeValue, Attributes, ScopeInfo};
pub use log::{LogDocument, Severity};
pub use metric::{
    HistogramValue, MetricKind, MetricPointDocument, MetricValue, QuantileValue, SummaryValue,
};
pub use tenant::{OrganizationId, OrganizationIdError, SignalKind};
pub use trace::{SpanDocument, SpanEvent, SpanKind, SpanLink, SpanStatus, StatusCode};
