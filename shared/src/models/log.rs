//! Log document model.
//!
//! Defines the storage-ready record produced for every OTLP log record.

use crate::models::{AttributeValue, Attributes, ScopeInfo};
use serde::Serialize;

/// Canonical log severity name.
///
/// Derived from the numeric OTLP severity code; see [`crate::otlp::severity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Codes 1-4.
    Trace,
    /// Codes 5-8.
    Debug,
    /// Codes 9-12, and every out-of-range code.
    #[default]
    Info,
    /// Codes 13-16.
    Warn,
    /// Codes 17-20.
    Error,
    /// Codes 21-24.
    Fatal,
}

impl Severity {
    /// Returns the canonical uppercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized log record, ready for storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogDocument {
    /// Event time in nanoseconds since the Unix epoch (0 if unknown).
    pub time_unix_nano: u64,
    /// Time the record was observed by the collection system.
    pub observed_time_unix_nano: u64,
    /// Numeric severity code as sent on the wire.
    pub severity_number: i32,
    /// Severity name derived from `severity_number`.
    pub severity: Severity,
    /// Record body.
    pub body: AttributeValue,
    /// Record attributes.
    pub attributes: Attributes,
    /// Attributes of the emitting resource.
    pub resource: Attributes,
    /// Instrumentation scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeInfo>,
    /// Correlated trace identifier (lowercase hex).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Correlated span identifier (lowercase hex).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    /// W3C trace flags.
    pub flags: u32,
    /// Tags associated at upload time.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<String>,
}

impl LogDocument {
    /// Associates tag identifiers with the record.
    #[must_use]
    pub fn with_tag_ids(mut self, tag_ids: Vec<String>) -> Self {
        self.tag_ids = tag_ids;
        self
    }

    /// Returns the event time in nanoseconds, falling back to the observed time when
    /// the event time is unset.
    #[must_use]
    pub fn event_time_unix_nano(&self) -> u64 {
        if self.time_unix_nano > 0 {
            self.time_unix_nano
        } else {
            self.observed_time_unix_nano
        }
    }
}
