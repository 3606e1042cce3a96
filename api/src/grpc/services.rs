//! gRPC service implementations for OTLP collectors.
//!
//! Every export call is dispatched the same way: resolve the tenant from the call
//! metadata, look up its handler triple, convert, persist, acknowledge.

use crate::state::AppState;
use shared::ingest::{IngestError, IngestSummary, TenantServices};
use shared::otlp::proto;
use shared::tenancy::{CallAuthority, CallMetadata, ResolveError};
use std::sync::Arc;
use tonic::metadata::AsciiMetadataValue;
use tonic::{Request, Response, Status};

/// Response metadata key carrying the number of accepted records.
pub const ACCEPTED_RECORDS_KEY: &str = "accepted-records";

/// Resolves the tenant of a call and returns its handler triple.
///
/// Unresolved calls fail with `UNAUTHENTICATED`, resolved but unregistered
/// organizations with `PERMISSION_DENIED`.
async fn tenant_services<T>(
    state: &AppState,
    request: &Request<T>,
) -> Result<Arc<TenantServices>, Status> {
    let metadata = CallMetadata::from_grpc(
        request.metadata(),
        request.extensions().get::<CallAuthority>(),
    );

    let tenant = state
        .resolver()
        .resolve(&metadata)
        .await
        .map_err(|e| match e {
            ResolveError::Unresolved => {
                tracing::debug!("Rejecting call with unresolved organization");
                Status::unauthenticated("Unable to resolve organization for this call")
            }
            ResolveError::Lookup(err) => {
                tracing::error!(error = %err, "Token lookup failed");
                Status::unavailable("Token store unavailable")
            }
        })?;

    state
        .registry()
        .lookup(&tenant.organization_id)
        .ok_or_else(|| {
            tracing::warn!(
                organization_id = %tenant.organization_id,
                source = tenant.source.as_str(),
                "Organization is not served"
            );
            Status::permission_denied(format!(
                "Organization {} is not served by this gateway",
                tenant.organization_id
            ))
        })
}

fn ingest_failure(err: &IngestError) -> Status {
    tracing::error!(error = %err, "Failed to ingest OTLP export");
    Status::unavailable("Failed to persist records")
}

fn rejected_i64(summary: &IngestSummary) -> i64 {
    i64::try_from(summary.rejected).unwrap_or(i64::MAX)
}

/// Wraps an export response, attaching the accepted count as metadata.
fn acknowledge<T>(message: T, summary: &IngestSummary) -> Response<T> {
    let mut response = Response::new(message);
    if let Ok(value) = summary.accepted.to_string().parse::<AsciiMetadataValue>() {
        response.metadata_mut().insert(ACCEPTED_RECORDS_KEY, value);
    }
    response
}

/// Implementation of the OTLP `LogsService` gRPC service.
#[derive(Clone)]
pub struct LogsServiceImpl {
    state: AppState,
}

impl LogsServiceImpl {
    /// Creates a new `LogsServiceImpl` with the given application state.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[tonic::async_trait]
impl proto::collector::logs::v1::logs_service_server::LogsService for LogsServiceImpl {
    async fn export(
        &self,
        request: Request<proto::collector::logs::v1::ExportLogsServiceRequest>,
    ) -> Result<Response<proto::collector::logs::v1::ExportLogsServiceResponse>, Status> {
        let services = tenant_services(&self.state, &request).await?;
        let summary = services
            .logs
            .export(request.get_ref(), &[])
            .await
            .map_err(|e| ingest_failure(&e))?;

        tracing::debug!(
            organization_id = %services.organization_id(),
            accepted = summary.accepted,
            rejected = summary.rejected,
            "Processed OTLP gRPC logs"
        );

        let response = proto::collector::logs::v1::ExportLogsServiceResponse {
            partial_success: (summary.rejected > 0).then(|| {
                proto::collector::logs::v1::ExportLogsPartialSuccess {
                    rejected_log_records: rejected_i64(&summary),
                    error_message: summary.error_message(),
                }
            }),
        };

        Ok(acknowledge(response, &summary))
    }
}

/// Implementation of the OTLP `MetricsService` gRPC service.
#[derive(Clone)]
pub struct MetricsServiceImpl {
    state: AppState,
}

impl MetricsServiceImpl {
    /// Creates a new `MetricsServiceImpl` with the given application state.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[tonic::async_trait]
impl proto::collector::metrics::v1::metrics_service_server::MetricsService for MetricsServiceImpl {
    async fn export(
        &self,
        request: Request<proto::collector::metrics::v1::ExportMetricsServiceRequest>,
    ) -> Result<Response<proto::collector::metrics::v1::ExportMetricsServiceResponse>, Status> {
        let services = tenant_services(&self.state, &request).await?;
        let summary = services
            .metrics
            .export(request.get_ref(), &[])
            .await
            .map_err(|e| ingest_failure(&e))?;

        tracing::debug!(
            organization_id = %services.organization_id(),
            accepted = summary.accepted,
            rejected = summary.rejected,
            "Processed OTLP gRPC metrics"
        );

        let response = proto::collector::metrics::v1::ExportMetricsServiceResponse {
            partial_success: (summary.rejected > 0).then(|| {
                proto::collector::metrics::v1::ExportMetricsPartialSuccess {
                    rejected_data_points: rejected_i64(&summary),
                    error_message: summary.error_message(),
                }
            }),
        };

        Ok(acknowledge(response, &summary))
    }
}

/// Implementation of the OTLP `TraceService` gRPC service.
#[derive(Clone)]
pub struct TracesServiceImpl {
    state: AppState,
}

impl TracesServiceImpl {
    /// Creates a new `TracesServiceImpl` with the given application state.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[tonic::async_trait]
impl proto::collector::trace::v1::trace_service_server::TraceService for TracesServiceImpl {
    async fn export(
        &self,
        request: Request<proto::collector::trace::v1::ExportTraceServiceRequest>,
    ) -> Result<Response<proto::collector::trace::v1::ExportTraceServiceResponse>, Status> {
        let services = tenant_services(&self.state, &request).await?;
        let summary = services
            .traces
            .export(request.get_ref(), &[])
            .await
            .map_err(|e| ingest_failure(&e))?;

        tracing::debug!(
            organization_id = %services.organization_id(),
            accepted = summary.accepted,
            rejected = summary.rejected,
            "Processed OTLP gRPC traces"
        );

        let response = proto::collector::trace::v1::ExportTraceServiceResponse {
            partial_success: (summary.rejected > 0).then(|| {
                proto::collector::trace::v1::ExportTracePartialSuccess {
                    rejected_spans: rejected_i64(&summary),
                    error_message: summary.error_message(),
                }
            }),
        };

        Ok(acknowledge(response, &summary))
    }
}
