//! Conversions from OTLP resource bundles to otelgate documents.
//!
//! Each converter handles one resource bundle: resource attributes are flattened once
//! and shared by every record under the resource, scope identity is attached per
//! scope grouping, and record-local attributes are decoded per record. Conversion is
//! per record: a malformed record is reported in [`Conversion::rejected`] while its
//! siblings are still converted.

use crate::models::{
    Attributes, HistogramValue, LogDocument, MetricKind, MetricPointDocument, MetricValue,
    QuantileValue, ScopeInfo, SpanDocument, SpanEvent, SpanKind, SpanLink, SpanStatus,
    StatusCode, SummaryValue,
};
use crate::otlp::attributes::{
    decode_attributes, decode_optional_value, decode_scope, encode_id, resource_attributes,
};
use crate::otlp::classify::classify_metric;
use crate::otlp::proto;
use crate::otlp::proto::common::v1::KeyValue;
use crate::otlp::severity::severity_for;
use thiserror::Error;

/// A record that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// A number data point carried neither an integer nor a double value.
    #[error("metric {metric:?} has a data point with no numeric value")]
    MissingNumericValue {
        /// Name of the metric owning the point.
        metric: String,
    },

    /// The metric shape is not converted; all of its points were dropped.
    #[error("metric {metric:?} has an unsupported shape, {points} data points dropped")]
    UnsupportedMetricShape {
        /// Name of the metric.
        metric: String,
        /// Number of dropped data points.
        points: usize,
    },
}

impl ConversionError {
    /// Number of wire records this rejection accounts for.
    #[must_use]
    pub fn rejected_records(&self) -> usize {
        match self {
            Self::MissingNumericValue { .. } => 1,
            Self::UnsupportedMetricShape { points, .. } => *points,
        }
    }
}

/// Result of converting one or more resource bundles.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion<T> {
    /// Successfully converted records, in wire order.
    pub records: Vec<T>,
    /// Records that were rejected.
    pub rejected: Vec<ConversionError>,
}

impl<T> Default for Conversion<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> Conversion<T> {
    /// Total number of rejected wire records.
    #[must_use]
    pub fn rejected_count(&self) -> usize {
        self.rejected
            .iter()
            .map(ConversionError::rejected_records)
            .sum()
    }

    /// Appends another conversion result.
    pub fn extend(&mut self, other: Conversion<T>) {
        self.records.extend(other.records);
        self.rejected.extend(other.rejected);
    }
}

// ========== Traces ==========

fn span_kind(kind: i32) -> SpanKind {
    use proto::trace::v1::span::SpanKind as OtlpSpanKind;

    match OtlpSpanKind::try_from(kind) {
        Ok(OtlpSpanKind::Internal) => SpanKind::Internal,
        Ok(OtlpSpanKind::Server) => SpanKind::Server,
        Ok(OtlpSpanKind::Client) => SpanKind::Client,
        Ok(OtlpSpanKind::Producer) => SpanKind::Producer,
        Ok(OtlpSpanKind::Consumer) => SpanKind::Consumer,
        Ok(OtlpSpanKind::Unspecified) | Err(_) => SpanKind::Unspecified,
    }
}

fn span_status(status: &proto::trace::v1::Status) -> SpanStatus {
    use proto::trace::v1::status::StatusCode as OtlpStatusCode;

    let code = match OtlpStatusCode::try_from(status.code) {
        Ok(OtlpStatusCode::Ok) => StatusCode::Ok,
        Ok(OtlpStatusCode::Error) => StatusCode::Error,
        Ok(OtlpStatusCode::Unset) | Err(_) => StatusCode::Unset,
    };

    SpanStatus {
        code,
        message: status.message.clone(),
    }
}

/// Converts one OTLP span.
#[must_use]
pub fn convert_span(
    span: &proto::trace::v1::Span,
    resource: &Attributes,
    scope: Option<&ScopeInfo>,
) -> SpanDocument {
    let events = span
        .events
        .iter()
        .map(|e| SpanEvent {
            name: e.name.clone(),
            time_unix_nano: e.time_unix_nano,
            attributes: decode_attributes(&e.attributes),
        })
        .collect();

    let links = span
        .links
        .iter()
        .map(|l| SpanLink {
            trace_id: hex::encode(&l.trace_id),
            span_id: hex::encode(&l.span_id),
            attributes: decode_attributes(&l.attributes),
        })
        .collect();

    SpanDocument {
        trace_id: hex::encode(&span.trace_id),
        span_id: hex::encode(&span.span_id),
        parent_span_id: encode_id(&span.parent_span_id),
        name: span.name.clone(),
        kind: span_kind(span.kind),
        start_time_unix_nano: span.start_time_unix_nano,
        end_time_unix_nano: span.end_time_unix_nano,
        status: span.status.as_ref().map(span_status),
        attributes: decode_attributes(&span.attributes),
        resource: resource.clone(),
        scope: scope.cloned(),
        events,
        links,
        tag_ids: Vec::new(),
    }
}

/// Converts every span of one resource bundle.
#[must_use]
pub fn convert_resource_spans(bundle: &proto::trace::v1::ResourceSpans) -> Conversion<SpanDocument> {
    let mut conversion = Conversion::default();
    if bundle.resource.is_none() && bundle.scope_spans.is_empty() {
        return conversion;
    }

    let resource = resource_attributes(bundle.resource.as_ref());
    for scope_spans in &bundle.scope_spans {
        let scope = decode_scope(scope_spans.scope.as_ref());
        conversion.records.extend(
            scope_spans
                .spans
                .iter()
                .map(|span| convert_span(span, &resource, scope.as_ref())),
        );
    }

    conversion
}

/// Converts every bundle of a trace export request.
#[must_use]
pub fn convert_trace_request(
    request: &proto::collector::trace::v1::ExportTraceServiceRequest,
) -> Conversion<SpanDocument> {
    let mut conversion = Conversion::default();
    for bundle in &request.resource_spans {
        conversion.extend(convert_resource_spans(bundle));
    }
    conversion
}

// ========== Metrics ==========

/// Fields shared by every point of one metric.
struct PointContext<'a> {
    metric: &'a proto::metrics::v1::Metric,
    kind: MetricKind,
    resource: &'a Attributes,
    scope: Option<&'a ScopeInfo>,
}

impl PointContext<'_> {
    fn document(
        &self,
        start_time_unix_nano: u64,
        time_unix_nano: u64,
        attributes: &[KeyValue],
        value: MetricValue,
    ) -> MetricPointDocument {
        MetricPointDocument {
            name: self.metric.name.clone(),
            description: self.metric.description.clone(),
            unit: self.metric.unit.clone(),
            kind: self.kind,
            start_time_unix_nano,
            time_unix_nano,
            value,
            attributes: decode_attributes(attributes),
            resource: self.resource.clone(),
            scope: self.scope.cloned(),
            tag_ids: Vec::new(),
        }
    }

    fn number_points(
        &self,
        points: &[proto::metrics::v1::NumberDataPoint],
        conversion: &mut Conversion<MetricPointDocument>,
    ) {
        use proto::metrics::v1::number_data_point::Value;

        for point in points {
            let value = match point.value {
                Some(Value::AsInt(i)) => MetricValue::Int(i),
                Some(Value::AsDouble(d)) => MetricValue::Double(d),
                None => {
                    conversion.rejected.push(ConversionError::MissingNumericValue {
                        metric: self.metric.name.clone(),
                    });
                    continue;
                }
            };
            conversion.records.push(self.document(
                point.start_time_unix_nano,
                point.time_unix_nano,
                &point.attributes,
                value,
            ));
        }
    }
}

/// Converts every data point of one metric.
#[must_use]
pub fn convert_metric(
    metric: &proto::metrics::v1::Metric,
    resource: &Attributes,
    scope: Option<&ScopeInfo>,
) -> Conversion<MetricPointDocument> {
    use proto::metrics::v1::metric::Data;

    let mut conversion = Conversion::default();
    let context = PointContext {
        metric,
        kind: classify_metric(metric),
        resource,
        scope,
    };

    match &metric.data {
        Some(Data::Gauge(gauge)) => context.number_points(&gauge.data_points, &mut conversion),
        Some(Data::Sum(sum)) => context.number_points(&sum.data_points, &mut conversion),
        Some(Data::Histogram(histogram)) => {
            conversion
                .records
                .extend(histogram.data_points.iter().map(|point| {
                    context.document(
                        point.start_time_unix_nano,
                        point.time_unix_nano,
                        &point.attributes,
                        MetricValue::Histogram(HistogramValue {
                            count: point.count,
                            sum: point.sum,
                            min: point.min,
                            max: point.max,
                            bucket_counts: point.bucket_counts.clone(),
                            explicit_bounds: point.explicit_bounds.clone(),
                        }),
                    )
                }));
        }
        Some(Data::Summary(summary)) => {
            conversion
                .records
                .extend(summary.data_points.iter().map(|point| {
                    context.document(
                        point.start_time_unix_nano,
                        point.time_unix_nano,
                        &point.attributes,
                        MetricValue::Summary(SummaryValue {
                            count: point.count,
                            sum: point.sum,
                            quantiles: point
                                .quantile_values
                                .iter()
                                .map(|q| QuantileValue {
                                    quantile: q.quantile,
                                    value: q.value,
                                })
                                .collect(),
                        }),
                    )
                }));
        }
        Some(Data::ExponentialHistogram(histogram)) => {
            tracing::warn!(metric = %metric.name, "Exponential histograms are not supported");
            if !histogram.data_points.is_empty() {
                conversion
                    .rejected
                    .push(ConversionError::UnsupportedMetricShape {
                        metric: metric.name.clone(),
                        points: histogram.data_points.len(),
                    });
            }
        }
        None => {
            tracing::debug!(metric = %metric.name, "Metric carries no data");
        }
    }

    conversion
}

/// Converts every metric of one resource bundle.
#[must_use]
pub fn convert_resource_metrics(
    bundle: &proto::metrics::v1::ResourceMetrics,
) -> Conversion<MetricPointDocument> {
    let mut conversion = Conversion::default();
    if bundle.resource.is_none() && bundle.scope_metrics.is_empty() {
        return conversion;
    }

    let resource = resource_attributes(bundle.resource.as_ref());
    for scope_metrics in &bundle.scope_metrics {
        let scope = decode_scope(scope_metrics.scope.as_ref());
        for metric in &scope_metrics.metrics {
            conversion.extend(convert_metric(metric, &resource, scope.as_ref()));
        }
    }

    conversion
}

/// Converts every bundle of a metrics export request.
#[must_use]
pub fn convert_metrics_request(
    request: &proto::collector::metrics::v1::ExportMetricsServiceRequest,
) -> Conversion<MetricPointDocument> {
    let mut conversion = Conversion::default();
    for bundle in &request.resource_metrics {
        conversion.extend(convert_resource_metrics(bundle));
    }
    conversion
}

// ========== Logs ==========

/// Converts one OTLP log record.
///
/// The severity name is always derived from the numeric code; any severity text on
/// the wire is ignored.
#[must_use]
pub fn convert_log_record(
    record: &proto::logs::v1::LogRecord,
    resource: &Attributes,
    scope: Option<&ScopeInfo>,
) -> LogDocument {
    LogDocument {
        time_unix_nano: record.time_unix_nano,
        observed_time_unix_nano: record.observed_time_unix_nano,
        severity_number: record.severity_number,
        severity: severity_for(record.severity_number),
        body: decode_optional_value(record.body.as_ref()),
        attributes: decode_attributes(&record.attributes),
        resource: resource.clone(),
        scope: scope.cloned(),
        trace_id: encode_id(&record.trace_id),
        span_id: encode_id(&record.span_id),
        flags: record.flags,
        tag_ids: Vec::new(),
    }
}

/// Converts every log record of one resource bundle.
#[must_use]
pub fn convert_resource_logs(bundle: &proto::logs::v1::ResourceLogs) -> Conversion<LogDocument> {
    let mut conversion = Conversion::default();
    if bundle.resource.is_none() && bundle.scope_logs.is_empty() {
        return conversion;
    }

    let resource = resource_attributes(bundle.resource.as_ref());
    for scope_logs in &bundle.scope_logs {
        let scope = decode_scope(scope_logs.scope.as_ref());
        conversion.records.extend(
            scope_logs
                .log_records
                .iter()
                .map(|record| convert_log_record(record, &resource, scope.as_ref())),
        );
    }

    conversion
}

/// Converts every bundle of a logs export request.
#[must_use]
pub fn convert_logs_request(
    request: &proto::collector::logs::v1::ExportLogsServiceRequest,
) -> Conversion<LogDocument> {
    let mut conversion = Conversion::default();
    for bundle in &request.resource_logs {
        conversion.extend(convert_resource_logs(bundle));
    }
    conversion
}

#[cfg(test)]
mod basic_tests {
    use super::*;

    #[test]
    fn test_span_kind_mapping() {
        assert_eq!(span_kind(0), SpanKind::Unspecified);
        assert_eq!(span_kind(1), SpanKind::Internal);
        assert_eq!(span_kind(2), SpanKind::Server);
        assert_eq!(span_kind(3), SpanKind::Client);
        assert_eq!(span_kind(4), SpanKind::Producer);
        assert_eq!(span_kind(5), SpanKind::Consumer);
        assert_eq!(span_kind(42), SpanKind::Unspecified);
    }

    #[test]
    fn test_span_status_mapping() {
        let status = span_status(&proto::trace::v1::Status {
            message: "boom".to_string(),
            code: 2,
        });
        assert_eq!(status.code, StatusCode::Error);
        assert_eq!(status.message, "boom");

        let unknown = span_status(&proto::trace::v1::Status {
            message: String::new(),
            code: 7,
        });
        assert_eq!(unknown.code, StatusCode::Unset);
    }

    #[test]
    fn test_rejected_count() {
        let conversion: Conversion<MetricPointDocument> = Conversion {
            records: vec![],
            rejected: vec![
                ConversionError::MissingNumericValue {
                    metric: "a".to_string(),
                },
                ConversionError::UnsupportedMetricShape {
                    metric: "b".to_string(),
                    points: 3,
                },
            ],
        };
        assert_eq!(conversion.rejected_count(), 4);
    }
}

#[cfg(test)]
#[path = "conversions_test.rs"]
mod conversions_test;
