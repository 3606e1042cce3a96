//! Application state module.
//!
//! Defines the shared state handed to the gRPC services and the HTTP route handlers.

use shared::storage::SignalStore;
use shared::tenancy::{
    StaticToken, TagValidator, TenantResolver, TenantServiceRegistry, TokenLookup,
};
use std::sync::Arc;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<TenantServiceRegistry>,
    resolver: TenantResolver,
    tags: Arc<dyn TagValidator>,
    store: Arc<dyn SignalStore>,
    admin_token: Option<StaticToken>,
}

impl AppState {
    /// Creates a new application state with an empty registry.
    pub fn new(
        store: Arc<dyn SignalStore>,
        tokens: Arc<dyn TokenLookup>,
        tags: Arc<dyn TagValidator>,
    ) -> Self {
        Self {
            registry: Arc::new(TenantServiceRegistry::new(Arc::clone(&store))),
            resolver: TenantResolver::new(tokens),
            tags,
            store,
            admin_token: None,
        }
    }

    /// Requires `token` as bearer credential on the admin routes.
    #[must_use]
    pub fn with_admin_token(mut self, token: StaticToken) -> Self {
        self.admin_token = Some(token);
        self
    }

    /// Returns the tenant service registry.
    #[must_use]
    pub fn registry(&self) -> &TenantServiceRegistry {
        &self.registry
    }

    /// Returns the tenant resolver.
    #[must_use]
    pub fn resolver(&self) -> &TenantResolver {
        &self.resolver
    }

    /// Returns the tag validator.
    #[must_use]
    pub fn tag_validator(&self) -> &dyn TagValidator {
        self.tags.as_ref()
    }

    /// Returns the signal store.
    #[must_use]
    pub fn store(&self) -> &dyn SignalStore {
        self.store.as_ref()
    }

    /// Returns the admin credential, if the admin routes are guarded.
    #[must_use]
    pub fn admin_token(&self) -> Option<&StaticToken> {
        self.admin_token.as_ref()
    }
}
