//! REST telemetry upload.
//!
//! Accepts an OTLP export request for an organization over HTTP and routes it through
//! the same converter and handlers as the gRPC services. Supports both protobuf
//! (`application/x-protobuf`) and OTLP/JSON bodies.
//!
//! # Endpoints
//!
//! - `POST /v0/orgs/{org_id}/telemetry/traces`
//! - `POST /v0/orgs/{org_id}/telemetry/metrics`
//! - `POST /v0/orgs/{org_id}/telemetry/logs`

use crate::routes::error::ApiError;
use crate::routes::organizations::OrganizationPath;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use shared::ingest::{IngestSummary, TenantServices};
use shared::models::{OrganizationId, SignalKind};
use shared::otlp::payload::{decode_request, PayloadFormat};
use shared::tenancy::metadata::AUTHORIZATION_KEY;
use shared::tenancy::{parse_tag_ids, CallMetadata, ResolutionSource, ResolveError};
use std::sync::Arc;
use validator::Validate;

/// Path parameters of an upload.
#[derive(Debug, Deserialize)]
pub struct TelemetryPath {
    /// Organization identifier.
    pub org_id: String,
    /// Signal kind of the body.
    pub signal: SignalKind,
}

/// Query parameters of an upload.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TelemetryQuery {
    /// Comma-separated tag identifiers to associate with every record.
    #[validate(length(max = 4096))]
    pub tag_ids: Option<String>,
}

/// Creates the telemetry upload routes.
pub fn telemetry_routes(state: AppState) -> Router {
    Router::new()
        .route("/v0/orgs/{org_id}/telemetry/{signal}", post(upload_telemetry))
        .with_state(state)
}

/// Checks that the bearer token is bound to `organization_id`.
async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    organization_id: &OrganizationId,
) -> Result<(), ApiError> {
    let metadata = CallMetadata::from_pairs(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| (AUTHORIZATION_KEY, v)),
    );

    match state.resolver().resolve(&metadata).await {
        Ok(tenant)
            if tenant.source == ResolutionSource::Bearer
                && &tenant.organization_id == organization_id =>
        {
            Ok(())
        }
        Ok(_) | Err(ResolveError::Unresolved) => Err(ApiError::unauthorized(format!(
            "Token is not valid for organization {organization_id}"
        ))),
        Err(ResolveError::Lookup(e)) => {
            tracing::error!(error = %e, "Token lookup failed");
            Err(ApiError::unavailable("Token store unavailable"))
        }
    }
}

/// Confirms that every tag exists for the organization.
async fn validate_tags(
    state: &AppState,
    organization_id: &OrganizationId,
    tag_ids: &[String],
) -> Result<(), ApiError> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let invalid = state
        .tag_validator()
        .invalid_tag_ids(organization_id, tag_ids)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Tag lookup failed");
            ApiError::unavailable("Tag store unavailable")
        })?;

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Invalid tag IDs: {}",
            invalid.join(", ")
        )))
    }
}

async fn export(
    services: &TenantServices,
    signal: SignalKind,
    body: &[u8],
    format: PayloadFormat,
    tag_ids: &[String],
) -> Result<IngestSummary, ApiError> {
    let bad_payload = |e: shared::otlp::payload::PayloadError| {
        tracing::debug!(error = %e, %signal, "Rejecting malformed upload");
        ApiError::bad_request(e.to_string())
    };

    let result = match signal {
        SignalKind::Traces => {
            let request = decode_request(body, format).map_err(bad_payload)?;
            services.traces.export(&request, tag_ids).await
        }
        SignalKind::Metrics => {
            let request = decode_request(body, format).map_err(bad_payload)?;
            services.metrics.export(&request, tag_ids).await
        }
        SignalKind::Logs => {
            let request = decode_request(body, format).map_err(bad_payload)?;
            services.logs.export(&request, tag_ids).await
        }
    };

    result.map_err(|e| {
        tracing::error!(error = %e, "Failed to ingest upload");
        ApiError::unavailable("Failed to persist records")
    })
}

/// Handler for POST /v0/orgs/{org_id}/telemetry/{signal}.
async fn upload_telemetry(
    State(state): State<AppState>,
    Path(path): Path<TelemetryPath>,
    Query(query): Query<TelemetryQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestSummary>, ApiError> {
    query.validate()?;
    let organization_id = OrganizationPath {
        org_id: path.org_id,
    }
    .organization_id()?;

    authenticate(&state, &headers, &organization_id).await?;

    let services: Arc<TenantServices> = state
        .registry()
        .lookup(&organization_id)
        .ok_or_else(|| {
            ApiError::forbidden(format!(
                "Organization {organization_id} is not served by this gateway"
            ))
        })?;

    let tag_ids = query
        .tag_ids
        .as_deref()
        .map(parse_tag_ids)
        .unwrap_or_default();
    validate_tags(&state, &organization_id, &tag_ids).await?;

    let format = PayloadFormat::from_content_type(
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
    );

    let summary = export(&services, path.signal, &body, format, &tag_ids).await?;

    tracing::debug!(
        %organization_id,
        signal = %path.signal,
        accepted = summary.accepted,
        rejected = summary.rejected,
        "Processed telemetry upload"
    );

    Ok(Json(summary))
}
