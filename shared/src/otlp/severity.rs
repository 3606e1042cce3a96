//! Severity code mapping.
//!
//! OTLP severity numbers form six bands of four codes each. Codes outside `1..=24`
//! (including 0 and negative values) map to `INFO`.

use crate::models::Severity;

/// Maps an OTLP severity number to its canonical severity.
#[must_use]
pub fn severity_for(severity_number: i32) -> Severity {
    // https://opentelemetry.io/docs/specs/otel/logs/data-model/#field-severitynumber
    match severity_number {
        1..=4 => Severity::Trace,
        5..=8 => Severity::Debug,
        9..=12 => Severity::Info,
        13..=16 => Severity::Warn,
        17..=20 => Severity::Error,
        21..=24 => Severity::Fatal,
        _ => Severity::Info,
    }
}

/// Maps an OTLP severity number to its canonical name (`"TRACE"` .. `"FATAL"`).
#[must_use]
pub fn severity_name(severity_number: i32) -> &'static str {
    severity_for(severity_number).as_str()
}
