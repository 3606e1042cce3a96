//! Span document model.
//!
//! Defines the storage-ready record produced for every OTLP span.

use crate::models::{Attributes, ScopeInfo};
use serde::Serialize;
use std::collections::HashMap;

/// Kind of span, named after the OTLP enum values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum SpanKind {
    /// Kind not specified (also used for unknown wire values).
    #[default]
    #[serde(rename = "SPAN_KIND_UNSPECIFIED")]
    Unspecified,
    /// Internal operation.
    #[serde(rename = "SPAN_KIND_INTERNAL")]
    Internal,
    /// Server handling a request.
    #[serde(rename = "SPAN_KIND_SERVER")]
    Server,
    /// Client making a request.
    #[serde(rename = "SPAN_KIND_CLIENT")]
    Client,
    /// Producer sending a message.
    #[serde(rename = "SPAN_KIND_PRODUCER")]
    Producer,
    /// Consumer receiving a message.
    #[serde(rename = "SPAN_KIND_CONSUMER")]
    Consumer,
}

impl SpanKind {
    /// Returns the canonical OTLP name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "SPAN_KIND_UNSPECIFIED",
            Self::Internal => "SPAN_KIND_INTERNAL",
            Self::Server => "SPAN_KIND_SERVER",
            Self::Client => "SPAN_KIND_CLIENT",
            Self::Producer => "SPAN_KIND_PRODUCER",
            Self::Consumer => "SPAN_KIND_CONSUMER",
        }
    }
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status code of a span, named after the OTLP enum values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum StatusCode {
    /// Status not set (also used for unknown wire values).
    #[default]
    #[serde(rename = "STATUS_CODE_UNSET")]
    Unset,
    /// Operation completed successfully.
    #[serde(rename = "STATUS_CODE_OK")]
    Ok,
    /// Operation failed.
    #[serde(rename = "STATUS_CODE_ERROR")]
    Error,
}

impl StatusCode {
    /// Returns the canonical OTLP name of the status code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "STATUS_CODE_UNSET",
            Self::Ok => "STATUS_CODE_OK",
            Self::Error => "STATUS_CODE_ERROR",
        }
    }
}

/// Span status as reported by the exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct SpanStatus {
    /// Status code.
    pub code: StatusCode,
    /// Developer-facing status message.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// An event recorded during a span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanEvent {
    /// The name of the event.
    pub name: String,
    /// Event time in nanoseconds since the Unix epoch.
    pub time_unix_nano: u64,
    /// Event attributes.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub attributes: Attributes,
}

/// A link from a span to another span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanLink {
    /// Linked trace ID (lowercase hex).
    pub trace_id: String,
    /// Linked span ID (lowercase hex).
    pub span_id: String,
    /// Link attributes.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub attributes: Attributes,
}

/// A normalized span, ready for storage.
///
/// Identifiers are the lowercase hex form of the wire bytes and timestamps are the
/// wire nanosecond values, untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanDocument {
    /// Trace identifier.
    pub trace_id: String,
    /// Span identifier.
    pub span_id: String,
    /// Parent span identifier (None for root spans).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    /// Operation name.
    pub name: String,
    /// Span kind.
    pub kind: SpanKind,
    /// Start time in nanoseconds since the Unix epoch.
    pub start_time_unix_nano: u64,
    /// End time in nanoseconds since the Unix epoch.
    pub end_time_unix_nano: u64,
    /// Status, if the exporter reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SpanStatus>,
    /// Span attributes.
    pub attributes: Attributes,
    /// Attributes of the emitting resource.
    pub resource: Attributes,
    /// Instrumentation scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeInfo>,
    /// Events recorded during the span.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SpanEvent>,
    /// Links to other spans.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<SpanLink>,
    /// Tags associated at upload time.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<String>,
}

impl SpanDocument {
    /// Associates tag identifiers with the span.
    #[must_use]
    pub fn with_tag_ids(mut self, tag_ids: Vec<String>) -> Self {
        self.tag_ids = tag_ids;
        self
    }

    /// Returns the span duration in nanoseconds (zero if end precedes start).
    #[must_use]
    pub fn duration_nanos(&self) -> u64 {
        self.end_time_unix_nano
            .saturating_sub(self.start_time_unix_nano)
    }

    /// Returns true if this is a root span (no parent).
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }

    /// Returns the `service.name` resource attribute, if present.
    #[must_use]
    pub fn service_name(&self) -> Option<&str> {
        self.resource
            .get("service.name")
            .and_then(crate::models::AttributeValue::as_str)
    }
}
