//! Process-wide table of served organizations.
//!
//! Maps each registered organization to its [`TenantServices`] triple. The triple is
//! built before the write lock is taken and swapped in whole, so a concurrent lookup
//! sees either the old triple, the new one, or none.

use crate::ingest::TenantServices;
use crate::models::OrganizationId;
use crate::storage::SignalStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Receives organization provisioning events.
pub trait OrganizationLifecycle: Send + Sync {
    /// Called when an organization starts being served.
    fn on_organization_provisioned(&self, organization_id: OrganizationId);

    /// Called when an organization stops being served.
    fn on_organization_deprovisioned(&self, organization_id: &OrganizationId);
}

/// Registry of per-organization handler triples.
pub struct TenantServiceRegistry {
    store: Arc<dyn SignalStore>,
    services: RwLock<HashMap<OrganizationId, Arc<TenantServices>>>,
}

impl TenantServiceRegistry {
    /// Creates an empty registry whose handlers persist into `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SignalStore>) -> Self {
        Self {
            store,
            services: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a fresh handler triple for an organization, replacing any prior one.
    pub fn register(&self, organization_id: OrganizationId) -> Arc<TenantServices> {
        let services = Arc::new(TenantServices::new(
            organization_id.clone(),
            Arc::clone(&self.store),
        ));

        let replaced = self
            .services
            .write()
            .insert(organization_id.clone(), Arc::clone(&services))
            .is_some();

        tracing::info!(%organization_id, replaced, "Registered organization");
        services
    }

    /// Removes an organization. Returns whether it was registered.
    pub fn deregister(&self, organization_id: &OrganizationId) -> bool {
        let removed = self.services.write().remove(organization_id).is_some();
        if removed {
            tracing::info!(%organization_id, "Deregistered organization");
        }
        removed
    }

    /// Returns the handler triple of an organization.
    #[must_use]
    pub fn lookup(&self, organization_id: &OrganizationId) -> Option<Arc<TenantServices>> {
        self.services.read().get(organization_id).cloned()
    }

    /// Returns true if the organization is registered.
    #[must_use]
    pub fn contains(&self, organization_id: &OrganizationId) -> bool {
        self.services.read().contains_key(organization_id)
    }

    /// Returns the registered organizations, sorted.
    #[must_use]
    pub fn organizations(&self) -> Vec<OrganizationId> {
        let mut ids: Vec<_> = self.services.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the number of registered organizations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    /// Returns true if no organization is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }
}

impl OrganizationLifecycle for TenantServiceRegistry {
    fn on_organization_provisioned(&self, organization_id: OrganizationId) {
        self.register(organization_id);
    }

    fn on_organization_deprovisioned(&self, organization_id: &OrganizationId) {
        self.deregister(organization_id);
    }
}

impl std::fmt::Debug for TenantServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantServiceRegistry")
            .field("organizations", &self.organizations())
            .finish_non_exhaustive()
    }
}
