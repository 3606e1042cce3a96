//! Bearer-token lookup.
//!
//! Raw tokens never reach a credential store. They are first digested with a keyed
//! one-way transform (HMAC-SHA256, lower-case hex) and the digest is the lookup key.

use crate::models::OrganizationId;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use parking_lot::RwLock;
use sha2::Sha256;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur during token lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenLookupError {
    /// The token store could not be consulted.
    #[error("Token store unavailable: {0}")]
    Unavailable(String),

    /// The digest secret is unusable.
    #[error("Invalid token secret: {0}")]
    InvalidSecret(String),
}

/// Capability resolving a raw bearer token to an organization.
#[async_trait]
pub trait TokenLookup: Send + Sync {
    /// Returns the organization bound to the token.
    ///
    /// Returns `Ok(None)` both for unknown tokens and for account-level tokens that
    /// are not bound to an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be consulted.
    async fn resolve_organization(
        &self,
        raw_token: &str,
    ) -> Result<Option<OrganizationId>, TokenLookupError>;
}

/// Keyed digest of raw tokens.
#[derive(Clone)]
pub struct TokenDigester {
    mac: HmacSha256,
}

impl TokenDigester {
    /// Creates a digester keyed with the given secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, TokenLookupError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenLookupError::InvalidSecret(
                "secret must not be empty".to_string(),
            ));
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| TokenLookupError::InvalidSecret(e.to_string()))?;
        Ok(Self { mac })
    }

    fn keyed(&self, raw_token: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(raw_token.as_bytes());
        mac
    }

    /// Returns the lower-case hex digest of a raw token.
    #[must_use]
    pub fn digest(&self, raw_token: &str) -> String {
        hex::encode(self.keyed(raw_token).finalize().into_bytes())
    }

    /// Checks a raw token against a raw digest in constant time.
    #[must_use]
    pub fn verify(&self, raw_token: &str, digest: &[u8]) -> bool {
        self.keyed(raw_token).verify_slice(digest).is_ok()
    }
}

/// A single shared secret, such as an admin credential.
///
/// Only the keyed digest of the secret is kept, and candidates are compared against it
/// in constant time.
#[derive(Clone)]
pub struct StaticToken {
    digester: TokenDigester,
    digest: Vec<u8>,
}

impl StaticToken {
    /// Creates a static token from its secret value.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is empty.
    pub fn new(secret: &str) -> Result<Self, TokenLookupError> {
        let digester = TokenDigester::new(secret)?;
        let digest = digester.keyed(secret).finalize().into_bytes().to_vec();
        Ok(Self { digester, digest })
    }

    /// Returns true if `candidate` equals the secret.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.digester.verify(candidate, &self.digest)
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken").finish_non_exhaustive()
    }
}

impl std::fmt::Debug for TokenDigester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDigester").finish_non_exhaustive()
    }
}

/// A stored access token, keyed by its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenEntry {
    /// Digest of the raw token.
    pub digest: String,
    /// Organization the token is bound to; `None` for account-level tokens.
    pub organization_id: Option<OrganizationId>,
}

impl FromStr for AccessTokenEntry {
    type Err = String;

    /// Parses `digest` or `digest:organization`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digest, organization) = match s.trim().split_once(':') {
            Some((digest, org)) => (digest.trim(), Some(org.trim())),
            None => (s.trim(), None),
        };

        if digest.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid token digest: {digest:?}"));
        }

        let organization_id = organization
            .map(OrganizationId::new)
            .transpose()
            .map_err(|e| format!("invalid organization for token {digest}: {e}"))?;

        Ok(Self {
            digest: digest.to_ascii_lowercase(),
            organization_id,
        })
    }
}

/// In-memory token store for development and testing.
#[derive(Debug)]
pub struct InMemoryTokenStore {
    digester: TokenDigester,
    records: RwLock<HashMap<String, Option<OrganizationId>>>,
}

impl InMemoryTokenStore {
    /// Creates an empty store using the given digester.
    #[must_use]
    pub fn new(digester: TokenDigester) -> Self {
        Self {
            digester,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Stores an already-digested entry.
    pub fn insert_entry(&self, entry: AccessTokenEntry) {
        self.records
            .write()
            .insert(entry.digest, entry.organization_id);
    }

    /// Digests a raw token and stores it.
    pub fn insert_token(&self, raw_token: &str, organization_id: Option<OrganizationId>) {
        let digest = self.digester.digest(raw_token);
        self.records.write().insert(digest, organization_id);
    }

    /// Returns the number of stored tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if no tokens are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl TokenLookup for InMemoryTokenStore {
    async fn resolve_organization(
        &self,
        raw_token: &str,
    ) -> Result<Option<OrganizationId>, TokenLookupError> {
        let digest = self.digester.digest(raw_token);
        Ok(self.records.read().get(&digest).cloned().flatten())
    }
}
