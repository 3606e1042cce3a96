//! Integration tests for the OTLP gRPC services.
//!
//! These tests call the service implementations directly with tonic requests and
//! cover tenant resolution from metadata, authority and bearer credentials.

use super::common::{org, test_app, ACME, ACME_TOKEN, GLOBEX, GLOBEX_TOKEN, UNBOUND_TOKEN};
use api::grpc::{LogsServiceImpl, MetricsServiceImpl, TracesServiceImpl, ACCEPTED_RECORDS_KEY};
use shared::otlp::proto;
use shared::otlp::proto::collector::logs::v1::logs_service_server::LogsService;
use shared::otlp::proto::collector::metrics::v1::metrics_service_server::MetricsService;
use shared::otlp::proto::collector::trace::v1::trace_service_server::TraceService;
use shared::models::{OrganizationId, SignalKind};
use shared::storage::{SignalBatch, SignalStore, StorageError};
use shared::tenancy::{
    CallAuthority, InMemoryTagStore, InMemoryTokenStore, TokenDigester, TokenLookup,
    TokenLookupError,
};
use std::sync::Arc;
use tonic::Code;

/// Store whose backend is down.
struct FailingStore;

#[tonic::async_trait]
impl SignalStore for FailingStore {
    async fn persist(&self, _org: &OrganizationId, _batch: SignalBatch) -> Result<(), StorageError> {
        Err(StorageError::Backend("connection reset".to_string()))
    }

    async fn count(&self, _org: &OrganizationId, _kind: SignalKind) -> Result<usize, StorageError> {
        Err(StorageError::Backend("connection reset".to_string()))
    }
}

/// Token store that cannot be consulted.
struct FailingTokens;

#[tonic::async_trait]
impl TokenLookup for FailingTokens {
    async fn resolve_organization(
        &self,
        _raw_token: &str,
    ) -> Result<Option<OrganizationId>, TokenLookupError> {
        Err(TokenLookupError::Unavailable("connection refused".to_string()))
    }
}

fn string_value(s: &str) -> proto::common::v1::AnyValue {
    proto::common::v1::AnyValue {
        value: Some(proto::common::v1::any_value::Value::StringValue(
            s.to_string(),
        )),
    }
}

fn logs_request(bodies: &[&str]) -> proto::collector::logs::v1::ExportLogsServiceRequest {
    proto::collector::logs::v1::ExportLogsServiceRequest {
        resource_logs: vec![proto::logs::v1::ResourceLogs {
            resource: Some(proto::resource::v1::Resource {
                attributes: vec![proto::common::v1::KeyValue {
                    key: "service.name".to_string(),
                    value: Some(string_value("checkout")),
                }],
                ..Default::default()
            }),
            scope_logs: vec![proto::logs::v1::ScopeLogs {
                log_records: bodies
                    .iter()
                    .map(|body| proto::logs::v1::LogRecord {
                        time_unix_nano: 1_700_000_000_000_000_000,
                        severity_number: 13,
                        body: Some(string_value(body)),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

fn with_organization_header<T>(message: T, organization: &str) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    request
        .metadata_mut()
        .insert("organization-id", organization.parse().unwrap());
    request
}

fn with_bearer<T>(message: T, token: &str) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    request
        .metadata_mut()
        .insert("authorization", format!("Bearer {token}").parse().unwrap());
    request
}

#[tokio::test]
async fn test_logs_resolved_from_organization_header() {
    let app = test_app();
    let service = LogsServiceImpl::new(app.state.clone());

    let response = service
        .export(with_organization_header(
            logs_request(&["first", "second"]),
            ACME,
        ))
        .await
        .unwrap();

    assert_eq!(
        response
            .metadata()
            .get(ACCEPTED_RECORDS_KEY)
            .and_then(|v| v.to_str().ok()),
        Some("2")
    );
    assert!(response.into_inner().partial_success.is_none());

    let logs = app.store.logs(&org(ACME)).await;
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].severity.as_str(), "WARN");
    assert_eq!(
        logs[0].resource.get("service.name").and_then(|v| v.as_str()),
        Some("checkout")
    );
}

#[tokio::test]
async fn test_logs_resolved_from_authority() {
    let app = test_app();
    let service = LogsServiceImpl::new(app.state.clone());

    let mut request = tonic::Request::new(logs_request(&["hello"]));
    request
        .extensions_mut()
        .insert(CallAuthority("acme.ingest.example.com:4317".to_string()));

    service.export(request).await.unwrap();
    assert_eq!(app.store.logs(&org(ACME)).await.len(), 1);
}

#[tokio::test]
async fn test_logs_resolved_from_bearer_token() {
    let app = test_app();
    let service = LogsServiceImpl::new(app.state.clone());

    service
        .export(with_bearer(logs_request(&["hello"]), ACME_TOKEN))
        .await
        .unwrap();
    assert_eq!(app.store.logs(&org(ACME)).await.len(), 1);
}

#[tokio::test]
async fn test_header_takes_precedence_over_bearer() {
    let app = test_app();
    let service = LogsServiceImpl::new(app.state.clone());

    let mut request = with_bearer(logs_request(&["hello"]), GLOBEX_TOKEN);
    request
        .metadata_mut()
        .insert("organization-id", ACME.parse().unwrap());

    service.export(request).await.unwrap();
    assert_eq!(app.store.logs(&org(ACME)).await.len(), 1);
    assert!(app.store.logs(&org(GLOBEX)).await.is_empty());
}

#[tokio::test]
async fn test_unresolved_call_is_unauthenticated() {
    let app = test_app();
    let service = LogsServiceImpl::new(app.state.clone());

    let status = service
        .export(tonic::Request::new(logs_request(&["hello"])))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    let status = service
        .export(with_bearer(logs_request(&["hello"]), "unknown-token"))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    let status = service
        .export(with_bearer(logs_request(&["hello"]), UNBOUND_TOKEN))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
}

#[tokio::test]
async fn test_unregistered_organization_is_permission_denied() {
    let app = test_app();
    let service = LogsServiceImpl::new(app.state.clone());

    let status = service
        .export(with_bearer(logs_request(&["hello"]), GLOBEX_TOKEN))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
    assert!(app.store.logs(&org(GLOBEX)).await.is_empty());
}

#[tokio::test]
async fn test_deregistered_organization_stops_being_served() {
    let app = test_app();
    let service = LogsServiceImpl::new(app.state.clone());

    assert!(app.state.registry().deregister(&org(ACME)));

    let status = service
        .export(with_organization_header(logs_request(&["hello"]), ACME))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
}

#[tokio::test]
async fn test_traces_export() {
    let app = test_app();
    let service = TracesServiceImpl::new(app.state.clone());

    let request = proto::collector::trace::v1::ExportTraceServiceRequest {
        resource_spans: vec![proto::trace::v1::ResourceSpans {
            scope_spans: vec![proto::trace::v1::ScopeSpans {
                spans: vec![proto::trace::v1::Span {
                    trace_id: vec![1; 16],
                    span_id: vec![2; 8],
                    name: "GET /checkout".to_string(),
                    kind: 2,
                    start_time_unix_nano: 1_000,
                    end_time_unix_nano: 3_000,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let response = service
        .export(with_organization_header(request, ACME))
        .await
        .unwrap();
    assert!(response.into_inner().partial_success.is_none());

    let spans = app.store.spans(&org(ACME)).await;
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].trace_id, "01".repeat(16));
    assert_eq!(spans[0].span_id, "02".repeat(8));
    assert_eq!(spans[0].name, "GET /checkout");
}

#[tokio::test]
async fn test_metrics_partial_success() {
    let app = test_app();
    let service = MetricsServiceImpl::new(app.state.clone());

    let gauge_point = |value| proto::metrics::v1::NumberDataPoint {
        time_unix_nano: 1_000,
        value,
        ..Default::default()
    };

    let request = proto::collector::metrics::v1::ExportMetricsServiceRequest {
        resource_metrics: vec![proto::metrics::v1::ResourceMetrics {
            scope_metrics: vec![proto::metrics::v1::ScopeMetrics {
                metrics: vec![proto::metrics::v1::Metric {
                    name: "queue.depth".to_string(),
                    data: Some(proto::metrics::v1::metric::Data::Gauge(
                        proto::metrics::v1::Gauge {
                            data_points: vec![
                                gauge_point(Some(
                                    proto::metrics::v1::number_data_point::Value::AsInt(7),
                                )),
                                gauge_point(None),
                            ],
                        },
                    )),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };

    let response = service
        .export(with_organization_header(request, ACME))
        .await
        .unwrap();

    assert_eq!(
        response
            .metadata()
            .get(ACCEPTED_RECORDS_KEY)
            .and_then(|v| v.to_str().ok()),
        Some("1")
    );
    let partial = response.into_inner().partial_success.unwrap();
    assert_eq!(partial.rejected_data_points, 1);
    assert!(partial.error_message.contains("queue.depth"));

    assert_eq!(app.store.metric_points(&org(ACME)).await.len(), 1);
}

#[tokio::test]
async fn test_empty_export_is_acknowledged() {
    let app = test_app();
    let service = LogsServiceImpl::new(app.state.clone());

    let response = service
        .export(with_organization_header(
            proto::collector::logs::v1::ExportLogsServiceRequest::default(),
            ACME,
        ))
        .await
        .unwrap();

    assert_eq!(
        response
            .metadata()
            .get(ACCEPTED_RECORDS_KEY)
            .and_then(|v| v.to_str().ok()),
        Some("0")
    );
    assert!(app.store.logs(&org(ACME)).await.is_empty());
}

#[tokio::test]
async fn test_store_failure_is_unavailable() {
    let tokens = InMemoryTokenStore::new(TokenDigester::new("test-secret").unwrap());
    let state = api::AppState::new(
        Arc::new(FailingStore),
        Arc::new(tokens),
        Arc::new(InMemoryTagStore::new()),
    );
    state.registry().register(org(ACME));
    let service = LogsServiceImpl::new(state);

    let status = service
        .export(with_organization_header(logs_request(&["hello"]), ACME))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::Unavailable);
    assert!(status.metadata().get(ACCEPTED_RECORDS_KEY).is_none());
}

#[tokio::test]
async fn test_token_lookup_failure_is_unavailable() {
    let app = test_app();
    let state = api::AppState::new(
        app.store.clone(),
        Arc::new(FailingTokens),
        Arc::new(InMemoryTagStore::new()),
    );
    state.registry().register(org(ACME));
    let service = LogsServiceImpl::new(state);

    let status = service
        .export(with_bearer(logs_request(&["hello"]), ACME_TOKEN))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::Unavailable);
    assert!(app.store.logs(&org(ACME)).await.is_empty());
}
