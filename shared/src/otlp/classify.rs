//! Metric shape classification.

use crate::models::MetricKind;
use crate::otlp::proto::metrics::v1::{metric::Data, Metric};

/// Determines the kind of a metric from its populated shape.
///
/// The shape is a protobuf `oneof`, so at most one variant can be present. Sums
/// split on their monotonic flag. Exponential histograms and metrics with no data
/// classify as [`MetricKind::Unknown`].
#[must_use]
pub fn classify_metric(metric: &Metric) -> MetricKind {
    match &metric.data {
        Some(Data::Gauge(_)) => MetricKind::Gauge,
        Some(Data::Sum(sum)) if sum.is_monotonic => MetricKind::Counter,
        Some(Data::Sum(_)) => MetricKind::UpDownCounter,
        Some(Data::Histogram(_)) => MetricKind::Histogram,
        Some(Data::Summary(_)) => MetricKind::Summary,
        Some(Data::ExponentialHistogram(_)) | None => MetricKind::Unknown,
    }
}
