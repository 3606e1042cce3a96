//! `ClickHouse`-backed signal store.
//!
//! Each signal kind has its own table. Rows carry the owning organization, a few key
//! columns for filtering and the full document encoded as JSON.

use crate::models::{
    LogDocument, MetricPointDocument, OrganizationId, SignalKind, SpanDocument,
};
use crate::storage::signal_store::{SignalBatch, SignalStore, StorageError};
use async_trait::async_trait;
use std::sync::Arc;

/// Table holding spans.
pub const SPANS_TABLE: &str = "spans";
/// Table holding metric points.
pub const METRIC_POINTS_TABLE: &str = "metric_points";
/// Table holding log records.
pub const LOGS_TABLE: &str = "logs";

/// Returns the table that stores documents of the given kind.
#[must_use]
pub fn table_for(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::Traces => SPANS_TABLE,
        SignalKind::Metrics => METRIC_POINTS_TABLE,
        SignalKind::Logs => LOGS_TABLE,
    }
}

#[derive(clickhouse::Row, serde::Serialize)]
struct SpanRow {
    organization_id: String,
    trace_id: String,
    span_id: String,
    name: String,
    service_name: String,
    start_time_unix_nano: u64,
    duration_nanos: u64,
    is_root: bool,
    document: String,
}

#[derive(clickhouse::Row, serde::Serialize)]
struct MetricPointRow {
    organization_id: String,
    name: String,
    kind: String,
    time_unix_nano: u64,
    document: String,
}

#[derive(clickhouse::Row, serde::Serialize)]
struct LogRow {
    organization_id: String,
    severity: String,
    time_unix_nano: u64,
    trace_id: String,
    body: String,
    document: String,
}

impl SpanRow {
    fn new(organization_id: &str, doc: &SpanDocument) -> Result<Self, StorageError> {
        Ok(Self {
            organization_id: organization_id.to_string(),
            trace_id: doc.trace_id.clone(),
            span_id: doc.span_id.clone(),
            name: doc.name.clone(),
            service_name: doc.service_name().unwrap_or_default().to_string(),
            start_time_unix_nano: doc.start_time_unix_nano,
            duration_nanos: doc.duration_nanos(),
            is_root: doc.is_root(),
            document: serde_json::to_string(doc)?,
        })
    }
}

impl MetricPointRow {
    fn new(organization_id: &str, doc: &MetricPointDocument) -> Result<Self, StorageError> {
        Ok(Self {
            organization_id: organization_id.to_string(),
            name: doc.name.clone(),
            kind: doc.kind.to_string(),
            time_unix_nano: doc.time_unix_nano,
            document: serde_json::to_string(doc)?,
        })
    }
}

impl LogRow {
    fn new(organization_id: &str, doc: &LogDocument) -> Result<Self, StorageError> {
        Ok(Self {
            organization_id: organization_id.to_string(),
            severity: doc.severity.to_string(),
            time_unix_nano: doc.event_time_unix_nano(),
            trace_id: doc.trace_id.clone().unwrap_or_default(),
            body: doc.body.render(),
            document: serde_json::to_string(doc)?,
        })
    }
}

fn backend(err: &clickhouse::error::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

/// `ClickHouse` signal store implementation.
#[derive(Clone)]
pub struct ClickHouseSignalStore {
    client: Arc<clickhouse::Client>,
}

impl ClickHouseSignalStore {
    /// Creates a new store with the given client.
    #[must_use]
    pub fn new(client: Arc<clickhouse::Client>) -> Self {
        Self { client }
    }

    /// Creates a new store wrapped in an Arc.
    #[must_use]
    pub fn new_shared(client: Arc<clickhouse::Client>) -> Arc<Self> {
        Arc::new(Self::new(client))
    }

    /// Creates the signal tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        let statements = [
            format!(
                "CREATE TABLE IF NOT EXISTS {SPANS_TABLE} (
                    organization_id String,
                    trace_id String,
                    span_id String,
                    name String,
                    service_name LowCardinality(String),
                    start_time_unix_nano UInt64,
                    duration_nanos UInt64,
                    is_root Bool,
                    document String
                ) ENGINE = MergeTree ORDER BY (organization_id, start_time_unix_nano)"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {METRIC_POINTS_TABLE} (
                    organization_id String,
                    name String,
                    kind LowCardinality(String),
                    time_unix_nano UInt64,
                    document String
                ) ENGINE = MergeTree ORDER BY (organization_id, name, time_unix_nano)"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {LOGS_TABLE} (
                    organization_id String,
                    severity LowCardinality(String),
                    time_unix_nano UInt64,
                    trace_id String,
                    body String,
                    document String
                ) ENGINE = MergeTree ORDER BY (organization_id, time_unix_nano)"
            ),
        ];

        for sql in &statements {
            self.client
                .query(sql)
                .execute()
                .await
                .map_err(|e| backend(&e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl SignalStore for ClickHouseSignalStore {
    async fn persist(&self, org: &OrganizationId, batch: SignalBatch) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }

        let organization_id = org.as_str();
        match batch {
            SignalBatch::Spans(docs) => {
                let rows = docs
                    .iter()
                    .map(|doc| SpanRow::new(&organization_id, doc))
                    .collect::<Result<Vec<_>, StorageError>>()?;
                let mut insert = self
                    .client
                    .insert::<SpanRow>(SPANS_TABLE)
                    .await
                    .map_err(|e| backend(&e))?;
                for row in &rows {
                    insert.write(row).await.map_err(|e| backend(&e))?;
                }
                insert.end().await.map_err(|e| backend(&e))
            }
            SignalBatch::MetricPoints(docs) => {
                let rows = docs
                    .iter()
                    .map(|doc| MetricPointRow::new(&organization_id, doc))
                    .collect::<Result<Vec<_>, StorageError>>()?;
                let mut insert = self
                    .client
                    .insert::<MetricPointRow>(METRIC_POINTS_TABLE)
                    .await
                    .map_err(|e| backend(&e))?;
                for row in &rows {
                    insert.write(row).await.map_err(|e| backend(&e))?;
                }
                insert.end().await.map_err(|e| backend(&e))
            }
            SignalBatch::Logs(docs) => {
                let rows = docs
                    .iter()
                    .map(|doc| LogRow::new(&organization_id, doc))
                    .collect::<Result<Vec<_>, StorageError>>()?;
                let mut insert = self
                    .client
                    .insert::<LogRow>(LOGS_TABLE)
                    .await
                    .map_err(|e| backend(&e))?;
                for row in &rows {
                    insert.write(row).await.map_err(|e| backend(&e))?;
                }
                insert.end().await.map_err(|e| backend(&e))
            }
        }
    }

    async fn count(&self, org: &OrganizationId, kind: SignalKind) -> Result<usize, StorageError> {
        let sql = format!(
            "SELECT count() FROM {} WHERE organization_id = ?",
            table_for(kind)
        );
        let count: u64 = self
            .client
            .query(&sql)
            .bind(org.as_str())
            .fetch_one::<u64>()
            .await
            .map_err(|e| backend(&e))?;

        Ok(usize::try_from(count).unwrap_or(usize::MAX))
    }
}
