//! Tenant resolution.
//!
//! Determines the organization an inbound call belongs to. Resolution walks a fixed
//! priority chain and the first step that produces an organization wins:
//!
//! 1. an explicit `organization-id` entry,
//! 2. the left-most label of the `:authority` host,
//! 3. the organization bound to the `authorization` bearer token.

use crate::models::OrganizationId;
use crate::tenancy::metadata::{
    CallMetadata, AUTHORITY_KEY, AUTHORIZATION_KEY, ORGANIZATION_ID_KEY,
};
use crate::tenancy::token::{TokenLookup, TokenLookupError};
use std::net::IpAddr;
use std::sync::Arc;
use thiserror::Error;

/// Which step of the chain produced the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Explicit `organization-id` entry.
    Header,
    /// Sub-domain of the call authority.
    Authority,
    /// Organization bound to the bearer token.
    Bearer,
}

impl ResolutionSource {
    /// Returns a short name for logging.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Authority => "authority",
            Self::Bearer => "bearer",
        }
    }
}

/// A successfully resolved tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTenant {
    /// The organization the call belongs to.
    pub organization_id: OrganizationId,
    /// How it was determined.
    pub source: ResolutionSource,
}

/// Errors that can occur during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No step of the chain produced an organization.
    #[error("Unable to resolve organization from call metadata")]
    Unresolved,

    /// The token store failed.
    #[error(transparent)]
    Lookup(#[from] TokenLookupError),
}

/// Returns the explicit organization entry, treating a blank value as absent.
#[must_use]
pub fn explicit_organization(metadata: &CallMetadata) -> Option<OrganizationId> {
    metadata
        .get(ORGANIZATION_ID_KEY)
        .and_then(|value| OrganizationId::new(value.trim()).ok())
}

/// Extracts the organization from an authority of the form `<org>.<rest-of-host>`.
///
/// Authorities without a dot, and IP literals, do not name an organization.
#[must_use]
pub fn organization_from_authority(authority: &str) -> Option<OrganizationId> {
    let authority = authority.trim();
    let authority = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);

    if authority.starts_with('[') {
        return None;
    }

    let host = match authority.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => authority,
    };

    if host.parse::<IpAddr>().is_ok() {
        return None;
    }

    let (label, rest) = host.split_once('.')?;
    if rest.is_empty() {
        return None;
    }
    OrganizationId::new(label).ok()
}

/// Extracts the token from a `Bearer <token>` authorization entry.
///
/// The scheme is matched case-insensitively; an empty token is treated as absent.
#[must_use]
pub fn bearer_token(metadata: &CallMetadata) -> Option<&str> {
    let value = metadata.get(AUTHORIZATION_KEY)?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolves inbound calls to organizations.
#[derive(Clone)]
pub struct TenantResolver {
    tokens: Arc<dyn TokenLookup>,
}

impl TenantResolver {
    /// Creates a resolver backed by the given token store.
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenLookup>) -> Self {
        Self { tokens }
    }

    /// Resolves the organization of one call.
    ///
    /// The token store is consulted only when neither an explicit entry nor the
    /// authority names an organization.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unresolved`] if no step produced an organization, or
    /// [`ResolveError::Lookup`] if the token store failed.
    pub async fn resolve(&self, metadata: &CallMetadata) -> Result<ResolvedTenant, ResolveError> {
        if let Some(organization_id) = explicit_organization(metadata) {
            return Ok(ResolvedTenant {
                organization_id,
                source: ResolutionSource::Header,
            });
        }

        if let Some(organization_id) = metadata
            .get(AUTHORITY_KEY)
            .and_then(organization_from_authority)
        {
            return Ok(ResolvedTenant {
                organization_id,
                source: ResolutionSource::Authority,
            });
        }

        if let Some(token) = bearer_token(metadata) {
            if let Some(organization_id) = self.tokens.resolve_organization(token).await? {
                return Ok(ResolvedTenant {
                    organization_id,
                    source: ResolutionSource::Bearer,
                });
            }
            tracing::debug!("Bearer token is not bound to an organization");
        }

        Err(ResolveError::Unresolved)
    }
}

impl std::fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantResolver").finish_non_exhaustive()
    }
}
