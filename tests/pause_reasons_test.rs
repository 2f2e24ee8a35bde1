mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use rstest::rstest;
use serde_json::json;

#[tokio::test]
async fn create_list_and_update_pause_reasons() {
    let app = TestApp::new().await;
    let id = app.create_pause_reason("Material shortage", "material").await;

    let response = app.get("/api/pause-reasons", &app.member).await;
    assert_eq!(response.status(), StatusCode::OK);
    let reasons = response_json(response).await;
    assert_eq!(reasons.as_array().unwrap().len(), 1);
    assert_eq!(reasons[0]["category"], "material");
    assert_eq!(reasons[0]["isActive"], true);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/pause-reasons/{id}"),
            Some(json!({ "name": "Waiting on stock", "category": "unplanned" })),
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = response_json(response).await;
    assert_eq!(updated["name"], "Waiting on stock");
    assert_eq!(updated["category"], "unplanned");
}

#[rstest]
#[case(json!({ "name": "Jam", "category": "catastrophe" }), "Invalid category")]
#[case(json!({ "category": "quality" }), "name is required")]
#[case(json!({ "name": "Jam" }), "category is required")]
#[tokio::test]
async fn invalid_pause_reason_is_rejected(#[case] body: serde_json::Value, #[case] message: &str) {
    let app = TestApp::new().await;

    let response = app.post("/api/pause-reasons", body, &app.admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = response_json(response).await["error"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(error.contains(message), "unexpected error: {error}");
}

#[tokio::test]
async fn categories_need_only_a_session() {
    let app = TestApp::new().await;
    let token = common::session_token(&app.state, app.member.id, None);

    let response = app
        .request(Method::GET, "/api/pause-reasons/categories", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let categories = response_json(response).await;
    let values: Vec<&str> = categories
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["value"].as_str().unwrap())
        .collect();
    assert_eq!(
        values,
        ["planned", "unplanned", "maintenance", "quality", "material", "other"]
    );
    assert_eq!(categories[0]["label"], "Planned");
}

#[tokio::test]
async fn deleting_a_used_reason_deactivates_it() {
    let app = TestApp::new().await;
    let used = app.create_pause_reason("Changeover", "planned").await;
    let unused = app.create_pause_reason("Spare", "other").await;
    let woo_id = app.create_woo().await;

    app.post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;
    app.post(
        &format!("/api/work-order-operations/{woo_id}/pause"),
        json!({ "pauseReasonId": used }),
        &app.member,
    )
    .await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/pause-reasons/{used}"),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["result"], "deactivated");

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/pause-reasons/{unused}"),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response_json(response).await["result"], "deleted");

    let active = response_json(app.get("/api/pause-reasons", &app.member).await).await;
    assert!(active.as_array().unwrap().is_empty());

    let all = response_json(
        app.get("/api/pause-reasons?includeInactive=true", &app.member)
            .await,
    )
    .await;
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["isActive"], false);
}

#[tokio::test]
async fn usage_counts_pauses_per_reason() {
    let app = TestApp::new().await;
    let reason = app.create_pause_reason("Inspection", "quality").await;
    app.create_pause_reason("Lunch", "planned").await;
    let woo_id = app.create_woo().await;

    app.post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;
    for _ in 0..2 {
        app.post(
            &format!("/api/work-order-operations/{woo_id}/pause"),
            json!({ "pauseReasonId": reason }),
            &app.member,
        )
        .await;
        app.post(&format!("/api/work-order-operations/{woo_id}/resume"), json!({}), &app.member)
            .await;
    }

    let response = app.get("/api/pause-reasons/usage", &app.member).await;
    assert_eq!(response.status(), StatusCode::OK);
    let usage = response_json(response).await;
    let inspection = usage
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["pauseReasonId"] == reason.as_str())
        .expect("inspection usage");
    assert_eq!(inspection["pauseCount"], 2);

    let lunch = usage
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["name"] == "Lunch")
        .expect("lunch usage");
    assert_eq!(lunch["pauseCount"], 0);
}

#[tokio::test]
async fn usage_window_excludes_older_pauses() {
    let app = TestApp::new().await;
    let reason = app.create_pause_reason("Inspection", "quality").await;
    let woo_id = app.create_woo().await;

    app.post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;
    app.post(
        &format!("/api/work-order-operations/{woo_id}/pause"),
        json!({ "pauseReasonId": reason }),
        &app.member,
    )
    .await;

    let response = app
        .get(
            "/api/pause-reasons/usage?startDate=2000-01-01&endDate=2000-01-31",
            &app.member,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let usage = response_json(response).await;
    assert_eq!(usage[0]["pauseCount"], 0);
}

#[rstest]
#[case("startDate=not-a-date", "Invalid startDate")]
#[case("endDate=2024-13-45", "Invalid endDate")]
#[tokio::test]
async fn usage_rejects_malformed_dates(#[case] query: &str, #[case] message: &str) {
    let app = TestApp::new().await;

    let response = app
        .get(&format!("/api/pause-reasons/usage?{query}"), &app.member)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = response_json(response).await["error"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(error.contains(message), "unexpected error: {error}");
}
