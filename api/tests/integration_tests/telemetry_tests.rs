//! Integration tests for REST telemetry uploads.
//!
//! Tests cover:
//! - Bearer authentication bound to the path organization
//! - Registry checks
//! - Tag validation
//! - Protobuf and OTLP/JSON bodies

use axum::http::StatusCode;
use prost::Message;
use shared::otlp::proto;

use super::common::{
    org, post_body, test_app, ACME, ACME_TAG, ACME_TOKEN, GLOBEX, GLOBEX_TOKEN,
};

const PROTOBUF: &str = "application/x-protobuf";

fn logs_body(count: usize) -> Vec<u8> {
    proto::collector::logs::v1::ExportLogsServiceRequest {
        resource_logs: vec![proto::logs::v1::ResourceLogs {
            scope_logs: vec![proto::logs::v1::ScopeLogs {
                log_records: (0..count)
                    .map(|i| proto::logs::v1::LogRecord {
                        time_unix_nano: 1_700_000_000_000_000_000 + i as u64,
                        severity_number: 9,
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
    .encode_to_vec()
}

fn upload_uri(organization: &str, signal: &str) -> String {
    format!("/v0/orgs/{organization}/telemetry/{signal}")
}

#[tokio::test]
async fn test_upload_logs_protobuf() {
    let app = test_app();

    let (status, response) = post_body(
        app.router,
        &upload_uri(ACME, "logs"),
        PROTOBUF,
        Some(ACME_TOKEN),
        logs_body(3),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["accepted"], 3);
    assert_eq!(response["rejected"], 0);
    assert_eq!(app.store.logs(&org(ACME)).await.len(), 3);
}

#[tokio::test]
async fn test_upload_applies_tags() {
    let app = test_app();

    let uri = format!("{}?tag_ids={ACME_TAG},{ACME_TAG}", upload_uri(ACME, "logs"));
    let (status, _) = post_body(app.router, &uri, PROTOBUF, Some(ACME_TOKEN), logs_body(1)).await;

    assert_eq!(status, StatusCode::OK);
    let logs = app.store.logs(&org(ACME)).await;
    assert_eq!(logs[0].tag_ids, vec![ACME_TAG.to_string()]);
}

#[tokio::test]
async fn test_upload_rejects_unknown_tags() {
    let app = test_app();

    let uri = format!(
        "{}?tag_ids=missing,{ACME_TAG},other",
        upload_uri(ACME, "logs")
    );
    let (status, response) =
        post_body(app.router, &uri, PROTOBUF, Some(ACME_TOKEN), logs_body(1)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Invalid tag IDs: missing, other");
    assert!(app.store.logs(&org(ACME)).await.is_empty());
}

#[tokio::test]
async fn test_upload_requires_bearer_token() {
    let app = test_app();

    let (status, response) = post_body(
        app.router.clone(),
        &upload_uri(ACME, "logs"),
        PROTOBUF,
        None,
        logs_body(1),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["code"], 401);

    let (status, _) = post_body(
        app.router,
        &upload_uri(ACME, "logs"),
        PROTOBUF,
        Some("not-a-token"),
        logs_body(1),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_token_for_other_organization_is_unauthorized() {
    let app = test_app();

    let (status, _) = post_body(
        app.router,
        &upload_uri(ACME, "logs"),
        PROTOBUF,
        Some(GLOBEX_TOKEN),
        logs_body(1),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.store.logs(&org(ACME)).await.is_empty());
}

#[tokio::test]
async fn test_upload_for_unregistered_organization_is_forbidden() {
    let app = test_app();

    let (status, response) = post_body(
        app.router,
        &upload_uri(GLOBEX, "logs"),
        PROTOBUF,
        Some(GLOBEX_TOKEN),
        logs_body(1),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["code"], 403);
}

#[tokio::test]
async fn test_upload_json_body() {
    let app = test_app();

    let (status, response) = post_body(
        app.router,
        &upload_uri(ACME, "traces"),
        "application/json",
        Some(ACME_TOKEN),
        br#"{"resourceSpans": []}"#.to_vec(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["accepted"], 0);
}

#[tokio::test]
async fn test_upload_malformed_body_is_bad_request() {
    let app = test_app();

    let (status, _) = post_body(
        app.router.clone(),
        &upload_uri(ACME, "metrics"),
        "application/json",
        Some(ACME_TOKEN),
        b"{not json".to_vec(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_body(
        app.router,
        &upload_uri(ACME, "logs"),
        PROTOBUF,
        Some(ACME_TOKEN),
        vec![0xff, 0xff, 0xff],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_unknown_signal_is_rejected() {
    let app = test_app();

    let (status, _) = post_body(
        app.router,
        &upload_uri(ACME, "profiles"),
        PROTOBUF,
        Some(ACME_TOKEN),
        logs_body(1),
    )
    .await;

    assert!(status.is_client_error());
}
