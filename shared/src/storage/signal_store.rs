//! Signal storage trait and the in-memory implementation.
//!
//! Provides the `SignalStore` trait through which ingestion handlers submit converted
//! documents, and an `InMemorySignalStore` partitioned by organization for
//! development and testing.

use crate::models::{
    LogDocument, MetricPointDocument, OrganizationId, SignalKind, SpanDocument,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A document could not be encoded for storage.
    #[error("Failed to encode document: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The storage backend rejected or failed the operation.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// One logical submission of converted documents of a single signal kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalBatch {
    /// Converted spans.
    Spans(Vec<SpanDocument>),
    /// Converted metric points.
    MetricPoints(Vec<MetricPointDocument>),
    /// Converted log records.
    Logs(Vec<LogDocument>),
}

impl SignalBatch {
    /// Returns the signal kind of the batch.
    #[must_use]
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::Spans(_) => SignalKind::Traces,
            Self::MetricPoints(_) => SignalKind::Metrics,
            Self::Logs(_) => SignalKind::Logs,
        }
    }

    /// Returns the number of documents in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Spans(docs) => docs.len(),
            Self::MetricPoints(docs) => docs.len(),
            Self::Logs(docs) => docs.len(),
        }
    }

    /// Returns true if the batch holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait for signal storage implementations.
///
/// Every operation is scoped to one organization; implementations must never return
/// or count documents of another organization.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Persists a batch of documents for an organization as one submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn persist(&self, org: &OrganizationId, batch: SignalBatch) -> Result<(), StorageError>;

    /// Returns the number of stored documents of a kind for an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    async fn count(&self, org: &OrganizationId, kind: SignalKind) -> Result<usize, StorageError>;
}

/// Documents stored for one organization.
#[derive(Debug, Default, Clone)]
struct Partition {
    spans: Vec<SpanDocument>,
    metric_points: Vec<MetricPointDocument>,
    logs: Vec<LogDocument>,
}

/// In-memory signal store implementation.
#[derive(Debug, Default)]
pub struct InMemorySignalStore {
    partitions: RwLock<HashMap<OrganizationId, Partition>>,
}

impl InMemorySignalStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns a copy of the spans stored for an organization.
    pub async fn spans(&self, org: &OrganizationId) -> Vec<SpanDocument> {
        let partitions = self.partitions.read().await;
        partitions
            .get(org)
            .map(|p| p.spans.clone())
            .unwrap_or_default()
    }

    /// Returns a copy of the metric points stored for an organization.
    pub async fn metric_points(&self, org: &OrganizationId) -> Vec<MetricPointDocument> {
        let partitions = self.partitions.read().await;
        partitions
            .get(org)
            .map(|p| p.metric_points.clone())
            .unwrap_or_default()
    }

    /// Returns a copy of the log records stored for an organization.
    pub async fn logs(&self, org: &OrganizationId) -> Vec<LogDocument> {
        let partitions = self.partitions.read().await;
        partitions
            .get(org)
            .map(|p| p.logs.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SignalStore for InMemorySignalStore {
    async fn persist(&self, org: &OrganizationId, batch: SignalBatch) -> Result<(), StorageError> {
        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(org.clone()).or_default();
        match batch {
            SignalBatch::Spans(docs) => partition.spans.extend(docs),
            SignalBatch::MetricPoints(docs) => partition.metric_points.extend(docs),
            SignalBatch::Logs(docs) => partition.logs.extend(docs),
        }
        Ok(())
    }

    async fn count(&self, org: &OrganizationId, kind: SignalKind) -> Result<usize, StorageError> {
        let partitions = self.partitions.read().await;
        Ok(partitions.get(org).map_or(0, |p| match kind {
            SignalKind::Traces => p.spans.len(),
            SignalKind::Metrics => p.metric_points.len(),
            SignalKind::Logs => p.logs.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttributeValue, Attributes, Severity};

    fn org(id: &str) -> OrganizationId {
        OrganizationId::new(id).unwrap()
    }

    fn log(body: &str) -> LogDocument {
        LogDocument {
            time_unix_nano: 1,
            observed_time_unix_nano: 1,
            severity_number: 9,
            severity: Severity::Info,
            body: AttributeValue::from(body),
            attributes: Attributes::new(),
            resource: Attributes::new(),
            scope: None,
            trace_id: None,
            span_id: None,
            flags: 0,
            tag_ids: vec![],
        }
    }

    #[test]
    fn test_batch_kind_and_len() {
        let batch = SignalBatch::Logs(vec![log("a"), log("b")]);
        assert_eq!(batch.kind(), SignalKind::Logs);
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert!(SignalBatch::Spans(vec![]).is_empty());
        assert_eq!(SignalBatch::MetricPoints(vec![]).kind(), SignalKind::Metrics);
    }

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = InMemorySignalStore::new();
        for kind in SignalKind::ALL {
            assert_eq!(store.count(&org("acme"), kind).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_persist_and_count() {
        let store = InMemorySignalStore::new();
        store
            .persist(&org("acme"), SignalBatch::Logs(vec![log("one"), log("two")]))
            .await
            .unwrap();
        store
            .persist(&org("acme"), SignalBatch::Logs(vec![log("three")]))
            .await
            .unwrap();

        assert_eq!(store.count(&org("acme"), SignalKind::Logs).await.unwrap(), 3);
        assert_eq!(store.count(&org("acme"), SignalKind::Traces).await.unwrap(), 0);

        let bodies: Vec<_> = store
            .logs(&org("acme"))
            .await
            .into_iter()
            .map(|l| l.body.render())
            .collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_partitions_are_isolated() {
        let store = InMemorySignalStore::new();
        store
            .persist(&org("acme"), SignalBatch::Logs(vec![log("secret")]))
            .await
            .unwrap();

        assert_eq!(store.count(&org("globex"), SignalKind::Logs).await.unwrap(), 0);
        assert!(store.logs(&org("globex")).await.is_empty());
        assert!(store.spans(&org("acme")).await.is_empty());
        assert!(store.metric_points(&org("acme")).await.is_empty());
    }
}
