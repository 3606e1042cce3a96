//! Per-tenant ingestion handlers.
//!
//! A [`TenantServices`] triple is bound to one organization. Each handler converts an
//! OTLP export request and submits every converted record to the [`SignalStore`] in a
//! single batch.

use crate::models::{LogDocument, MetricPointDocument, OrganizationId, SignalKind, SpanDocument};
use crate::otlp::conversions::{
    convert_logs_request, convert_metrics_request, convert_trace_request, Conversion,
};
use crate::otlp::proto::collector::{
    logs::v1::ExportLogsServiceRequest, metrics::v1::ExportMetricsServiceRequest,
    trace::v1::ExportTraceServiceRequest,
};
use crate::storage::{SignalBatch, SignalStore, StorageError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Outcome of one export call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Records converted and persisted.
    pub accepted: usize,
    /// Records rejected during conversion.
    pub rejected: usize,
    /// Reasons for the rejections.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl IngestSummary {
    /// Joins the rejection reasons into one message.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// Errors that can occur while ingesting.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Converted records could not be persisted.
    #[error("Failed to persist {kind} for organization {organization_id}: {source}")]
    Persistence {
        /// Organization the records belong to.
        organization_id: OrganizationId,
        /// Signal kind of the batch.
        kind: SignalKind,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
}

/// Documents that can carry upload tags.
trait Tagged {
    fn tagged(self, tag_ids: Vec<String>) -> Self;
}

impl Tagged for SpanDocument {
    fn tagged(self, tag_ids: Vec<String>) -> Self {
        self.with_tag_ids(tag_ids)
    }
}

impl Tagged for MetricPointDocument {
    fn tagged(self, tag_ids: Vec<String>) -> Self {
        self.with_tag_ids(tag_ids)
    }
}

impl Tagged for LogDocument {
    fn tagged(self, tag_ids: Vec<String>) -> Self {
        self.with_tag_ids(tag_ids)
    }
}

/// State shared by the three handlers of one tenant.
#[derive(Clone)]
struct HandlerCore {
    organization_id: OrganizationId,
    store: Arc<dyn SignalStore>,
}

impl HandlerCore {
    async fn submit<T: Tagged>(
        &self,
        kind: SignalKind,
        conversion: Conversion<T>,
        tag_ids: &[String],
        batch: fn(Vec<T>) -> SignalBatch,
    ) -> Result<IngestSummary, IngestError> {
        let summary = IngestSummary {
            accepted: conversion.records.len(),
            rejected: conversion.rejected_count(),
            errors: conversion.rejected.iter().map(ToString::to_string).collect(),
        };

        if summary.rejected > 0 {
            tracing::warn!(
                organization_id = %self.organization_id,
                kind = %kind,
                rejected = summary.rejected,
                "Rejected malformed records"
            );
        }

        if conversion.records.is_empty() {
            return Ok(summary);
        }

        let records = if tag_ids.is_empty() {
            conversion.records
        } else {
            conversion
                .records
                .into_iter()
                .map(|r| r.tagged(tag_ids.to_vec()))
                .collect()
        };

        self.store
            .persist(&self.organization_id, batch(records))
            .await
            .map_err(|source| IngestError::Persistence {
                organization_id: self.organization_id.clone(),
                kind,
                source,
            })?;

        tracing::debug!(
            organization_id = %self.organization_id,
            kind = %kind,
            accepted = summary.accepted,
            "Persisted records"
        );

        Ok(summary)
    }
}

/// Handles trace exports for one organization.
#[derive(Clone)]
pub struct TraceHandler {
    core: HandlerCore,
}

impl TraceHandler {
    /// Converts and persists a trace export request.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn export(
        &self,
        request: &ExportTraceServiceRequest,
        tag_ids: &[String],
    ) -> Result<IngestSummary, IngestError> {
        self.core
            .submit(
                SignalKind::Traces,
                convert_trace_request(request),
                tag_ids,
                SignalBatch::Spans,
            )
            .await
    }
}

/// Handles metric exports for one organization.
#[derive(Clone)]
pub struct MetricHandler {
    core: HandlerCore,
}

impl MetricHandler {
    /// Converts and persists a metrics export request.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn export(
        &self,
        request: &ExportMetricsServiceRequest,
        tag_ids: &[String],
    ) -> Result<IngestSummary, IngestError> {
        self.core
            .submit(
                SignalKind::Metrics,
                convert_metrics_request(request),
                tag_ids,
                SignalBatch::MetricPoints,
            )
            .await
    }
}

/// Handles log exports for one organization.
#[derive(Clone)]
pub struct LogHandler {
    core: HandlerCore,
}

impl LogHandler {
    /// Converts and persists a logs export request.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn export(
        &self,
        request: &ExportLogsServiceRequest,
        tag_ids: &[String],
    ) -> Result<IngestSummary, IngestError> {
        self.core
            .submit(
                SignalKind::Logs,
                convert_logs_request(request),
                tag_ids,
                SignalBatch::Logs,
            )
            .await
    }
}

/// The handler triple serving one organization.
#[derive(Clone)]
pub struct TenantServices {
    /// Trace handler.
    pub traces: TraceHandler,
    /// Metric handler.
    pub metrics: MetricHandler,
    /// Log handler.
    pub logs: LogHandler,
}

impl TenantServices {
    /// Builds all three handlers for an organization.
    #[must_use]
    pub fn new(organization_id: OrganizationId, store: Arc<dyn SignalStore>) -> Self {
        let core = HandlerCore {
            organization_id,
            store,
        };
        Self {
            traces: TraceHandler { core: core.clone() },
            metrics: MetricHandler { core: core.clone() },
            logs: LogHandler { core },
        }
    }

    /// Returns the organization the handlers are bound to.
    #[must_use]
    pub fn organization_id(&self) -> &OrganizationId {
        &self.traces.core.organization_id
    }
}

impl std::fmt::Debug for TenantServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantServices")
            .field("organization_id", self.organization_id())
            .finish_non_exhaustive()
    }
}
