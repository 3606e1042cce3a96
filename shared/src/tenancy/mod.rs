//! Multi-tenant routing.
//!
//! - [`metadata`] - call metadata and the captured `:authority`
//! - [`resolver`] - call metadata to organization
//! - [`token`] - bearer-token digests and lookup
//! - [`tags`] - tag reference validation
//! - [`registry`] - organization to handler triple

pub mod metadata;
pub mod registry;
pub mod resolver;
pub mod tags;
pub mod token;

pub use metadata::{CallAuthority, CallMetadata};
pub use registry::{OrganizationLifecycle, TenantServiceRegistry};
pub use resolver::{ResolutionSource, ResolveError, ResolvedTenant, TenantResolver};
pub use tags::{parse_tag_ids, InMemoryTagStore, TagEntry, TagLookupError, TagValidator};
pub use token::{
    AccessTokenEntry, InMemoryTokenStore, StaticToken, TokenDigester, TokenLookup,
    TokenLookupError,
};
