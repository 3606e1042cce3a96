//! Integration tests for health check and organization lifecycle routes.

use axum::http::StatusCode;

use shared::tenancy::StaticToken;

use super::common::{get, org, request, test_app, ACME, GLOBEX};

#[tokio::test]
async fn test_health_check() {
    let app = test_app();

    let (status, response) = get(app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "otelgate");
    assert_eq!(response["tenants"], 1);
}

#[tokio::test]
async fn test_list_organizations() {
    let app = test_app();

    let (status, response) = get(app.router, "/v0/admin/orgs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["organizations"], serde_json::json!([ACME]));
}

#[tokio::test]
async fn test_provision_and_deprovision_organization() {
    let app = test_app();
    let uri = format!("/v0/admin/orgs/{GLOBEX}");

    let (status, _) = request(app.router.clone(), "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.state.registry().contains(&org(GLOBEX)));

    // Provisioning twice keeps a single entry
    let (status, _) = request(app.router.clone(), "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.state.registry().len(), 2);

    let (status, _) = request(app.router.clone(), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!app.state.registry().contains(&org(GLOBEX)));

    // Deprovisioning an unknown organization is a no-op
    let (status, _) = request(app.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_admin_token_guards_lifecycle_routes() {
    let app = test_app();
    let admin = StaticToken::new("admin-secret").unwrap();
    let router = api::create_router(app.state.clone().with_admin_token(admin));
    let uri = format!("/v0/admin/orgs/{GLOBEX}");

    let (status, response) = request(router.clone(), "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["code"], 401);

    let (status, _) = request(router.clone(), "PUT", &uri, Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(router, "PUT", &uri, Some("admin-secret")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.state.registry().contains(&org(GLOBEX)));
}
