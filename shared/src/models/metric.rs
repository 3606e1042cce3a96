//! Metric point document model.
//!
//! Every OTLP data point becomes one [`MetricPointDocument`] carrying the kind of the
//! metric it belongs to.

use crate::models::{Attributes, ScopeInfo};
use serde::Serialize;

/// Kind of metric, derived from which shape field is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Instantaneous measurement.
    Gauge,
    /// Monotonic sum.
    Counter,
    /// Non-monotonic sum.
    UpDownCounter,
    /// Explicit-bucket histogram.
    Histogram,
    /// Quantile summary.
    Summary,
    /// No recognised shape populated.
    Unknown,
}

impl MetricKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gauge => "gauge",
            Self::Counter => "counter",
            Self::UpDownCounter => "updowncounter",
            Self::Histogram => "histogram",
            Self::Summary => "summary",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit-bucket histogram payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramValue {
    /// Number of observations.
    pub count: u64,
    /// Sum of observations, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    /// Minimum observation, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum observation, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Per-bucket counts.
    pub bucket_counts: Vec<u64>,
    /// Bucket upper bounds.
    pub explicit_bounds: Vec<f64>,
}

/// One quantile of a summary point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantileValue {
    /// Quantile in `[0.0, 1.0]`.
    pub quantile: f64,
    /// Value at the quantile.
    pub value: f64,
}

/// Summary payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryValue {
    /// Number of observations.
    pub count: u64,
    /// Sum of observations.
    pub sum: f64,
    /// Reported quantiles.
    pub quantiles: Vec<QuantileValue>,
}

/// The value of a metric point.
///
/// Number points keep the variant declared on the wire; integers are never widened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Integer number point.
    Int(i64),
    /// Floating-point number point.
    Double(f64),
    /// Histogram point.
    Histogram(HistogramValue),
    /// Summary point.
    Summary(SummaryValue),
}

impl MetricValue {
    /// Returns the numeric value as `f64` for number points.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Double(d) => Some(*d),
            Self::Histogram(_) | Self::Summary(_) => None,
        }
    }
}

/// A normalized metric data point, ready for storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPointDocument {
    /// Metric name.
    pub name: String,
    /// Metric description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Metric unit.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unit: String,
    /// Kind of the metric this point belongs to.
    pub kind: MetricKind,
    /// Start of the aggregation window in nanoseconds (0 if not reported).
    pub start_time_unix_nano: u64,
    /// Point time in nanoseconds since the Unix epoch.
    pub time_unix_nano: u64,
    /// Point value.
    pub value: MetricValue,
    /// Point attributes.
    pub attributes: Attributes,
    /// Attributes of the emitting resource.
    pub resource: Attributes,
    /// Instrumentation scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeInfo>,
    /// Tags associated at upload time.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<String>,
}

impl MetricPointDocument {
    /// Associates tag identifiers with the point.
    #[must_use]
    pub fn with_tag_ids(mut self, tag_ids: Vec<String>) -> Self {
        self.tag_ids = tag_ids;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metric_kind_names() {
        assert_eq!(MetricKind::UpDownCounter.as_str(), "updowncounter");
        assert_eq!(
            serde_json::to_value(MetricKind::UpDownCounter).unwrap(),
            json!("updowncounter")
        );
        assert_eq!(MetricKind::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_metric_value_keeps_declared_variant() {
        assert_eq!(serde_json::to_value(MetricValue::Int(42)).unwrap(), json!(42));
        assert_eq!(
            serde_json::to_value(MetricValue::Double(1.5)).unwrap(),
            json!(1.5)
        );
        assert_eq!(MetricValue::Int(3).as_f64(), Some(3.0));
    }

    #[test]
    fn test_histogram_value_serialization() {
        let value = MetricValue::Histogram(HistogramValue {
            count: 3,
            sum: Some(6.0),
            min: None,
            max: None,
            bucket_counts: vec![1, 2],
            explicit_bounds: vec![5.0],
        });

        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"count": 3, "sum": 6.0, "bucket_counts": [1, 2], "explicit_bounds": [5.0]})
        );
        assert_eq!(value.as_f64(), None);
    }
}
