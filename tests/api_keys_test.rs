mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn admin_creates_key_and_sees_plaintext_once() {
    let app = TestApp::new().await;
    let base = format!("/api/teams/{}/api-keys", app.team_id);

    let response = app.post(&base, json!({ "name": "ERP sync" }), &app.admin).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    let plaintext = created["apiKey"].as_str().unwrap();
    assert!(plaintext.starts_with(&app.state.config.api_key_prefix));
    assert_eq!(created["name"], "ERP sync");
    assert!(created.get("keyHash").is_none());

    let response = app.get(&base, &app.admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let keys = response_json(response).await;
    assert_eq!(keys.as_array().unwrap().len(), 1);
    assert!(keys[0].get("apiKey").is_none());

    let id = created["id"].as_str().unwrap();
    let response = app.get(&format!("{base}/{id}"), &app.admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["name"], "ERP sync");
}

#[tokio::test]
async fn members_cannot_manage_keys() {
    let app = TestApp::new().await;
    let base = format!("/api/teams/{}/api-keys", app.team_id);

    let response = app.post(&base, json!({ "name": "Sneaky" }), &app.member).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get(&base, &app.member).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn other_teams_keys_are_hidden() {
    let app = TestApp::new().await;
    let base = format!("/api/teams/{}/api-keys", app.team_id);

    let response = app.get(&base, &app.outsider).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(response).await["error"], "Team not found");
}

#[tokio::test]
async fn key_name_is_required_and_expiry_must_be_in_the_future() {
    let app = TestApp::new().await;
    let base = format!("/api/teams/{}/api-keys", app.team_id);

    let response = app.post(&base, json!({ "name": "" }), &app.admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post(
            &base,
            json!({ "name": "Old", "expiresAt": "2001-01-01T00:00:00Z" }),
            &app.admin,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn revoked_key_stops_authenticating() {
    let app = TestApp::new().await;
    let base = format!("/api/teams/{}/api-keys", app.team_id);

    let created =
        response_json(app.post(&base, json!({ "name": "MES bridge" }), &app.admin).await).await;
    let plaintext = created["apiKey"].as_str().unwrap().to_string();
    let id = created["id"].as_str().unwrap();

    let response = app
        .request_with_api_key("/api/v1/analytics/wip", &plaintext)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::DELETE,
            &format!("{base}/{id}"),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response_json(response).await["revokedAt"].is_string());

    let response = app
        .request_with_api_key("/api/v1/analytics/wip", &plaintext)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
