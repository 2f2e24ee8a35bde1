mod common;

use axum::http::StatusCode;
use common::{response_json, TestApp};
use serde_json::{json, Value};

#[tokio::test]
async fn operation_runs_through_full_lifecycle() {
    let app = TestApp::new().await;
    let woo_id = app.create_woo().await;
    let reason_id = app.create_pause_reason("Tool change", "maintenance").await;

    let response = app
        .post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let started = response_json(response).await;
    assert_eq!(started["status"], "in_progress");
    assert_eq!(started["operatorId"], app.member.id.to_string());
    assert!(started["actualStart"].is_string());

    let response = app
        .post(
            &format!("/api/work-order-operations/{woo_id}/pause"),
            json!({ "pauseReasonId": reason_id, "notes": "blade worn" }),
            &app.member,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "paused");

    let response = app
        .post(&format!("/api/work-order-operations/{woo_id}/resume"), json!({}), &app.member)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "in_progress");

    let response = app
        .post(
            &format!("/api/work-order-operations/{woo_id}/complete"),
            json!({ "quantityCompleted": 9, "quantityRejected": 1, "capturedData": { "torque": 12 } }),
            &app.member,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let completed = response_json(response).await;
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["quantityCompleted"], 9);
    assert_eq!(completed["quantityRejected"], 1);
    assert_eq!(completed["capturedData"]["torque"], 12);
    assert!(completed["actualEnd"].is_string());
}

#[tokio::test]
async fn starting_an_operation_moves_its_order_into_production() {
    let app = TestApp::new().await;
    let order = app.create_order(&["Cut", "Weld"]).await;
    assert_eq!(order["status"], "planned");
    let woo_id = order["operations"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let order_id = order["id"].as_str().unwrap();
    let response = app.get(&format!("/api/orders/{order_id}"), &app.member).await;
    assert_eq!(response_json(response).await["status"], "in_progress");
}

#[tokio::test]
async fn operation_from_another_team_is_not_found() {
    let app = TestApp::new().await;
    let woo_id = app.create_woo().await;

    let response = app
        .post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.outsider)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Work order operation not found");

    let response = app
        .get(&format!("/api/work-order-operations/{woo_id}"), &app.outsider)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pause_requires_a_reason() {
    let app = TestApp::new().await;
    let woo_id = app.create_woo().await;
    app.post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;

    let response = app
        .post(&format!("/api/work-order-operations/{woo_id}/pause"), json!({}), &app.member)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["error"], "pauseReasonId is required");

    let response = app
        .get(&format!("/api/work-order-operations/{woo_id}"), &app.member)
        .await;
    assert_eq!(response_json(response).await["status"], "in_progress");
}

#[tokio::test]
async fn pause_with_unknown_reason_is_not_found() {
    let app = TestApp::new().await;
    let woo_id = app.create_woo().await;
    app.post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;

    let response = app
        .post(
            &format!("/api/work-order-operations/{woo_id}/pause"),
            json!({ "pauseReasonId": uuid::Uuid::new_v4() }),
            &app.member,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn resuming_a_pending_operation_conflicts() {
    let app = TestApp::new().await;
    let woo_id = app.create_woo().await;

    let response = app
        .post(&format!("/api/work-order-operations/{woo_id}/resume"), json!({}), &app.member)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(response_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("pending"));
}

#[tokio::test]
async fn completing_a_paused_operation_conflicts() {
    let app = TestApp::new().await;
    let woo_id = app.create_woo().await;
    let reason_id = app.create_pause_reason("Break", "planned").await;

    app.post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;
    app.post(
        &format!("/api/work-order-operations/{woo_id}/pause"),
        json!({ "pauseReasonId": reason_id }),
        &app.member,
    )
    .await;

    let response = app
        .post(&format!("/api/work-order-operations/{woo_id}/complete"), json!({}), &app.member)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn starting_twice_conflicts() {
    let app = TestApp::new().await;
    let woo_id = app.create_woo().await;

    let first = app
        .post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn operations_can_be_filtered_by_order_and_status() {
    let app = TestApp::new().await;
    let order = app.create_order(&["Cut", "Weld", "Paint"]).await;
    app.create_order(&["Cut"]).await;
    let order_id = order["id"].as_str().unwrap();
    let first = order["operations"][0]["id"].as_str().unwrap();

    app.post(&format!("/api/work-order-operations/{first}/start"), json!({}), &app.member)
        .await;

    let response = app
        .get(&format!("/api/work-order-operations?orderId={order_id}"), &app.member)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await.as_array().unwrap().len(), 3);

    let response = app
        .get(
            &format!("/api/work-order-operations?orderId={order_id}&status=pending"),
            &app.member,
        )
        .await;
    assert_eq!(response_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_operation_id_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .post("/api/work-order-operations/not-a-uuid/start", json!({}), &app.member)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response_json(response).await["error"].is_string());
}

#[tokio::test]
async fn concurrent_starts_let_exactly_one_through() {
    let app = TestApp::with_config(|cfg| cfg.db_max_connections = 4).await;
    let woo_id = app.create_woo().await;
    let uri = format!("/api/work-order-operations/{woo_id}/start");

    let (a, b, c, d) = tokio::join!(
        app.post(&uri, json!({}), &app.member),
        app.post(&uri, json!({}), &app.member),
        app.post(&uri, json!({}), &app.admin),
        app.post(&uri, json!({}), &app.admin),
    );
    let mut statuses = vec![a.status(), b.status(), c.status(), d.status()];
    statuses.sort();
    assert_eq!(
        statuses,
        [
            StatusCode::OK,
            StatusCode::CONFLICT,
            StatusCode::CONFLICT,
            StatusCode::CONFLICT
        ]
    );

    let response = app
        .get(&format!("/api/work-order-operations/{woo_id}"), &app.member)
        .await;
    assert_eq!(response_json(response).await["status"], "in_progress");
}

#[tokio::test]
async fn concurrent_resumes_let_exactly_one_through() {
    let app = TestApp::with_config(|cfg| cfg.db_max_connections = 4).await;
    let woo_id = app.create_woo().await;
    let reason_id = app.create_pause_reason("Material shortage", "material").await;

    app.post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;
    let response = app
        .post(
            &format!("/api/work-order-operations/{woo_id}/pause"),
            json!({ "pauseReasonId": reason_id }),
            &app.member,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/work-order-operations/{woo_id}/resume");
    let (a, b, c) = tokio::join!(
        app.post(&uri, json!({}), &app.member),
        app.post(&uri, json!({}), &app.member),
        app.post(&uri, json!({}), &app.admin),
    );
    let mut statuses = vec![a.status(), b.status(), c.status()];
    statuses.sort();
    assert_eq!(
        statuses,
        [StatusCode::OK, StatusCode::CONFLICT, StatusCode::CONFLICT]
    );
}

#[tokio::test]
async fn captured_data_must_be_an_object() {
    let app = TestApp::new().await;
    let woo_id = app.create_woo().await;
    app.post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;

    let response = app
        .post(
            &format!("/api/work-order-operations/{woo_id}/complete"),
            json!({ "capturedData": [1, 2] }),
            &app.member,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response_json(response).await["error"],
        "capturedData must be a JSON object"
    );

    let response = app
        .get(&format!("/api/work-order-operations/{woo_id}"), &app.member)
        .await;
    assert_eq!(response_json(response).await["status"], "in_progress");
}

#[tokio::test]
async fn negative_quantities_are_rejected_on_complete() {
    let app = TestApp::new().await;
    let woo_id = app.create_woo().await;
    app.post(&format!("/api/work-order-operations/{woo_id}/start"), json!({}), &app.member)
        .await;

    for body in [
        json!({ "quantityCompleted": -1 }),
        json!({ "quantityCompleted": 5, "quantityRejected": -2 }),
    ] {
        let response = app
            .post(
                &format!("/api/work-order-operations/{woo_id}/complete"),
                body,
                &app.member,
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .get(&format!("/api/work-order-operations/{woo_id}"), &app.member)
        .await;
    let woo = response_json(response).await;
    assert_eq!(woo["status"], "in_progress");
    assert_eq!(woo["quantityCompleted"], 0);
}

#[tokio::test]
async fn operations_follow_routing_sequence() {
    let app = TestApp::new().await;
    let order = app
        .create_order(&["Saw", "Drill", "Tap", "Deburr", "Wash", "Inspect"])
        .await;
    let order_id = order["id"].as_str().unwrap();
    let routing_id = order["routingId"].as_str().unwrap();

    let response = app.get(&format!("/api/routings/{routing_id}"), &app.member).await;
    let routing = response_json(response).await;
    let expected: Vec<Value> = routing["operations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|step| step["id"].clone())
        .collect();

    let response = app
        .get(&format!("/api/work-order-operations?orderId={order_id}"), &app.member)
        .await;
    let listed: Vec<Value> = response_json(response)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|woo| woo["routingOperationId"].clone())
        .collect();
    assert_eq!(listed, expected);

    let response = app.get(&format!("/api/orders/{order_id}"), &app.member).await;
    let detail: Vec<Value> = response_json(response).await["operations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|woo| woo["routingOperationId"].clone())
        .collect();
    assert_eq!(detail, expected);
}
