mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use serde_json::json;

async fn issue_key(app: &TestApp) -> String {
    let response = app
        .post(
            &format!("/api/teams/{}/api-keys", app.team_id),
            json!({ "name": "Integration" }),
            &app.admin,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["apiKey"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn responses_carry_rate_limit_headers() {
    let app = TestApp::new().await;
    let key = issue_key(&app).await;

    let response = app
        .request_with_api_key("/api/v1/data-collection/activities", &key)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-ratelimit-limit"], "100");
    assert_eq!(headers["x-ratelimit-remaining"], "99");
    assert!(headers["x-ratelimit-reset"]
        .to_str()
        .unwrap()
        .parse::<i64>()
        .is_ok());
    assert_eq!(response_json(response).await, json!({ "data": [] }));
}

#[tokio::test]
async fn bearer_key_is_accepted() {
    let app = TestApp::new().await;
    let key = issue_key(&app).await;

    let response = app
        .request(Method::GET, "/api/v1/analytics/wip", None, Some(&key))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_or_unknown_key_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/analytics/wip", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["status"], 401);
    assert_eq!(body["message"], "Missing API key");

    let response = app
        .request_with_api_key("/api/v1/analytics/wip", "mes_not_a_real_key")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response_json(response).await["message"], "Invalid API key");
}

#[tokio::test]
async fn session_token_is_not_an_api_key() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/analytics/wip", None, Some(&app.admin.token))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn exceeding_the_window_is_rate_limited() {
    let app = TestApp::with_config(|cfg| cfg.rate_limit_requests_per_window = 2).await;
    let key = issue_key(&app).await;

    for _ in 0..2 {
        let response = app.request_with_api_key("/api/v1/analytics/wip", &key).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.request_with_api_key("/api/v1/analytics/wip", &key).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["x-ratelimit-limit"], "2");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    let body = response_json(response).await;
    assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(body["status"], 429);
}

#[tokio::test]
async fn routing_lookup_validates_and_scopes_the_id() {
    let app = TestApp::new().await;
    let key = issue_key(&app).await;
    let routing = app.create_routing(&["Cut", "Deburr"]).await;
    let routing_id = routing["id"].as_str().unwrap();

    let response = app
        .request_with_api_key(&format!("/api/v1/routings/{routing_id}"), &key)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["id"], routing_id);
    assert_eq!(body["data"]["operations"].as_array().unwrap().len(), 2);

    let response = app
        .request_with_api_key("/api/v1/routings/not-a-uuid", &key)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["code"], "VALIDATION_ERROR");

    let response = app
        .request_with_api_key(&format!("/api/v1/routings/{}", uuid::Uuid::new_v4()), &key)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(response).await["code"], "ROUTING_NOT_FOUND");
}

#[tokio::test]
async fn analytics_reflect_shop_floor_activity() {
    let app = TestApp::new().await;
    let key = issue_key(&app).await;
    let order = app.create_order(&["Cut", "Weld"]).await;
    let first = order["operations"][0]["id"].as_str().unwrap();
    let second = order["operations"][1]["id"].as_str().unwrap();

    app.post(&format!("/api/work-order-operations/{first}/start"), json!({}), &app.member)
        .await;
    app.post(
        &format!("/api/work-order-operations/{first}/complete"),
        json!({ "quantityCompleted": 9, "quantityRejected": 1 }),
        &app.member,
    )
    .await;
    app.post(&format!("/api/work-order-operations/{second}/start"), json!({}), &app.member)
        .await;

    let response = app.request_with_api_key("/api/v1/analytics/wip", &key).await;
    assert_eq!(response.status(), StatusCode::OK);
    let wip = response_json(response).await["data"].clone();
    assert_eq!(wip["counts"]["completed"], 1);
    assert_eq!(wip["counts"]["in_progress"], 1);
    assert_eq!(wip["counts"]["pending"], 0);
    assert_eq!(wip["counts"]["paused"], 0);
    assert_eq!(wip["activeOperations"].as_array().unwrap().len(), 1);
    assert_eq!(wip["openOrders"], 1);
    assert_eq!(wip["activeOperations"][0]["operationTitle"], "Weld");

    let response = app
        .request_with_api_key("/api/v1/analytics/performance", &key)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let performance = response_json(response).await["data"].clone();
    assert_eq!(performance["completedOperations"], 1);
    assert_eq!(performance["quantityCompleted"], 9);
    assert_eq!(performance["quantityRejected"], 1);
    assert_eq!(performance["yieldPercent"], 90.0);
    assert_eq!(performance["completedOrders"], 0);

    let response = app
        .request_with_api_key("/api/v1/analytics/performance?startDate=yesterday", &key)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn external_activities_list_only_active_definitions() {
    let app = TestApp::new().await;
    let key = issue_key(&app).await;
    for (name, active) in [("Torque check", true), ("Legacy", false)] {
        app.post(
            "/api/data-collection/activities",
            json!({
                "name": name,
                "isActive": active,
                "fields": [{ "id": "v", "name": "v", "label": "Value", "type": "number" }]
            }),
            &app.admin,
        )
        .await;
    }

    let response = app
        .request_with_api_key("/api/v1/data-collection/activities", &key)
        .await;
    let body = response_json(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Torque check"]);
}
