//! Organization lifecycle routes.
//!
//! Provisioning and deprovisioning events arrive here and drive the tenant service
//! registry.
//!
//! # Endpoints
//!
//! - `GET /v0/admin/orgs` - List served organizations
//! - `PUT /v0/admin/orgs/{org_id}` - Start serving an organization
//! - `DELETE /v0/admin/orgs/{org_id}` - Stop serving an organization

use crate::routes::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::OrganizationId;
use shared::tenancy::metadata::AUTHORIZATION_KEY;
use shared::tenancy::resolver::bearer_token;
use shared::tenancy::{CallMetadata, OrganizationLifecycle};
use validator::Validate;

/// Path parameters naming an organization.
#[derive(Debug, Deserialize, Validate)]
pub struct OrganizationPath {
    /// Organization identifier.
    #[validate(length(min = 1, max = 128))]
    pub org_id: String,
}

impl OrganizationPath {
    /// Validates the path and returns the organization identifier.
    ///
    /// # Errors
    ///
    /// Returns a 400 error if the identifier is blank or too long.
    pub fn organization_id(self) -> Result<OrganizationId, ApiError> {
        self.validate()?;
        OrganizationId::new(self.org_id).map_err(|e| ApiError::bad_request(e.to_string()))
    }
}

/// Response listing served organizations.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrganizationsResponse {
    /// Served organizations, sorted.
    pub organizations: Vec<OrganizationId>,
}

/// Creates the organization lifecycle routes.
pub fn organization_routes(state: AppState) -> Router {
    Router::new()
        .route("/v0/admin/orgs", get(list_organizations))
        .route(
            "/v0/admin/orgs/{org_id}",
            put(provision_organization).delete(deprovision_organization),
        )
        .with_state(state)
}

/// Checks the admin bearer token when one is configured.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.admin_token() else {
        return Ok(());
    };

    let metadata = CallMetadata::from_pairs(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| (AUTHORIZATION_KEY, v)),
    );

    match bearer_token(&metadata) {
        Some(token) if expected.matches(token) => Ok(()),
        _ => Err(ApiError::unauthorized("Admin token required")),
    }
}

/// Handler for GET /v0/admin/orgs.
async fn list_organizations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OrganizationsResponse>, ApiError> {
    require_admin(&state, &headers)?;
    Ok(Json(OrganizationsResponse {
        organizations: state.registry().organizations(),
    }))
}

/// Handler for PUT /v0/admin/orgs/{org_id}.
///
/// Registering an organization that is already served replaces its handlers.
async fn provision_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<OrganizationPath>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    let organization_id = path.organization_id()?;
    state.registry().on_organization_provisioned(organization_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for DELETE /v0/admin/orgs/{org_id}.
///
/// Deprovisioning an organization that is not served is a no-op.
async fn deprovision_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<OrganizationPath>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &headers)?;
    let organization_id = path.organization_id()?;
    state
        .registry()
        .on_organization_deprovisioned(&organization_id);
    Ok(StatusCode::NO_CONTENT)
}
