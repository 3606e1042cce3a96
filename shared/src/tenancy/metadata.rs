//! Call metadata consumed by tenant resolution.

use tonic::metadata::{KeyAndValueRef, MetadataMap};

/// Metadata key carrying an explicit organization identifier.
pub const ORGANIZATION_ID_KEY: &str = "organization-id";
/// Pseudo-header carrying the HTTP/2 authority.
pub const AUTHORITY_KEY: &str = ":authority";
/// Metadata key carrying the bearer credential.
pub const AUTHORIZATION_KEY: &str = "authorization";

/// The authority an inbound call was addressed to.
///
/// gRPC metadata does not include HTTP/2 pseudo-headers, so the server captures the
/// authority into this request extension before the call reaches a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallAuthority(pub String);

/// Ordered metadata entries of one inbound call.
///
/// Keys are stored lower-cased; lookups return the first entry for a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallMetadata {
    entries: Vec<(String, String)>,
}

impl CallMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds metadata from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut metadata = Self::new();
        for (key, value) in pairs {
            metadata.insert(key, value);
        }
        metadata
    }

    /// Builds metadata from gRPC request metadata and the captured authority.
    ///
    /// Binary entries and values that are not valid ASCII are skipped.
    #[must_use]
    pub fn from_grpc(metadata: &MetadataMap, authority: Option<&CallAuthority>) -> Self {
        let mut call = Self::new();
        if let Some(CallAuthority(authority)) = authority {
            call.insert(AUTHORITY_KEY, authority.as_str());
        }
        for entry in metadata.iter() {
            if let KeyAndValueRef::Ascii(key, value) = entry {
                if let Ok(value) = value.to_str() {
                    call.insert(key.as_str(), value);
                }
            }
        }
        call
    }

    /// Appends an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .push((key.into().to_ascii_lowercase(), value.into()));
    }

    /// Returns the first value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
