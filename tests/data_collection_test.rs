mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use serde_json::{json, Value};

fn measurement_fields() -> Value {
    json!([
        { "id": "diameter", "name": "diameter", "label": "Diameter", "type": "number", "required": true, "unit": "mm" },
        { "id": "finish", "name": "finish", "label": "Surface finish", "type": "select", "options": ["ok", "rework"] }
    ])
}

async fn create_activity(app: &TestApp) -> String {
    let response = app
        .post(
            "/api/data-collection/activities",
            json!({ "name": "Final measurement", "fields": measurement_fields() }),
            &app.admin,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn activity_field_without_label_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/data-collection/activities",
            json!({
                "name": "Broken",
                "fields": [{ "id": "x", "name": "x", "type": "text" }]
            }),
            &app.admin,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = response_json(response).await["error"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(error.contains("label"), "unexpected error: {error}");
}

#[tokio::test]
async fn duplicate_field_ids_are_rejected() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/data-collection/activities",
            json!({
                "name": "Dupes",
                "fields": [
                    { "id": "a", "name": "a", "label": "A", "type": "text" },
                    { "id": "a", "name": "b", "label": "B", "type": "text" }
                ]
            }),
            &app.admin,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assign_collect_and_read_back() {
    let app = TestApp::new().await;
    let activity_id = create_activity(&app).await;
    let order = app.create_order(&["Turn"]).await;
    let woo_id = order["operations"][0]["id"].as_str().unwrap().to_string();
    let routing_operation_id = order["operations"][0]["routingOperationId"]
        .as_str()
        .unwrap()
        .to_string();

    let assignment = json!({
        "routingOperationId": routing_operation_id,
        "dataCollectionActivityId": activity_id,
        "isRequired": true
    });
    let response = app
        .post("/api/data-collection/assign", assignment.clone(), &app.admin)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let link = response_json(response).await;
    assert_eq!(link["sequence"], 1);

    // Re-assigning updates the existing link
    let response = app
        .post("/api/data-collection/assign", assignment, &app.admin)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post(
            &format!("/api/work-order-operations/{woo_id}/data-collection"),
            json!({ "dataCollectionActivityId": activity_id, "data": { "finish": "ok" } }),
            &app.member,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response_json(response).await["error"],
        "Missing required field(s): diameter"
    );

    let response = app
        .post(
            &format!("/api/work-order-operations/{woo_id}/data-collection"),
            json!({ "dataCollectionActivityId": activity_id, "data": { "diameter": 24.98, "finish": "ok" } }),
            &app.member,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let collection = response_json(response).await;
    assert_eq!(collection["operatorId"], app.member.id.to_string());

    let response = app
        .get(&format!("/api/work-order-operations/{woo_id}/data-collection"), &app.member)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = response_json(response).await;
    assert_eq!(view["activities"].as_array().unwrap().len(), 1);
    assert_eq!(view["activities"][0]["isRequired"], true);
    assert_eq!(view["collections"].as_array().unwrap().len(), 1);
    assert_eq!(view["collections"][0]["data"]["diameter"], 24.98);

    let response = app
        .get(
            &format!("/api/data-collection/collect?workOrderOperationId={woo_id}"),
            &app.member,
        )
        .await;
    assert_eq!(response_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn collecting_for_an_unassigned_activity_is_rejected() {
    let app = TestApp::new().await;
    let activity_id = create_activity(&app).await;
    let woo_id = app.create_woo().await;

    let response = app
        .post(
            "/api/data-collection/collect",
            json!({
                "workOrderOperationId": woo_id,
                "dataCollectionActivityId": activity_id,
                "data": { "diameter": 25.0 }
            }),
            &app.member,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response_json(response).await["error"],
        "Activity is not assigned to this operation"
    );
}

#[tokio::test]
async fn unassign_requires_both_ids_and_an_existing_link() {
    let app = TestApp::new().await;
    let activity_id = create_activity(&app).await;
    let routing = app.create_routing(&["Drill"]).await;
    let operation_id = routing["operations"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/data-collection/assign?dataCollectionActivityId={activity_id}"),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!(
        "/api/data-collection/assign?routingOperationId={operation_id}&dataCollectionActivityId={activity_id}"
    );
    let response = app
        .request(Method::DELETE, &uri, None, Some(&app.admin.token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.post(
        "/api/data-collection/assign",
        json!({ "routingOperationId": operation_id, "dataCollectionActivityId": activity_id }),
        &app.admin,
    )
    .await;
    let response = app
        .request(Method::DELETE, &uri, None, Some(&app.admin.token))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn deleting_an_activity_with_history_deactivates_it() {
    let app = TestApp::new().await;
    let activity_id = create_activity(&app).await;
    let order = app.create_order(&["Turn"]).await;
    let woo_id = order["operations"][0]["id"].as_str().unwrap().to_string();
    let routing_operation_id = order["operations"][0]["routingOperationId"].clone();

    app.post(
        "/api/data-collection/assign",
        json!({ "routingOperationId": routing_operation_id, "dataCollectionActivityId": activity_id }),
        &app.admin,
    )
    .await;
    app.post(
        &format!("/api/work-order-operations/{woo_id}/data-collection"),
        json!({ "dataCollectionActivityId": activity_id, "data": { "diameter": 25.0 } }),
        &app.member,
    )
    .await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/data-collection/activities/{activity_id}"),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["deleted"], false);

    let response = app
        .get(&format!("/api/data-collection/activities/{activity_id}"), &app.admin)
        .await;
    assert_eq!(response_json(response).await["isActive"], false);

    let unused = create_activity(&app).await;
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/data-collection/activities/{unused}"),
            None,
            Some(&app.admin.token),
        )
        .await;
    assert_eq!(response_json(response).await["deleted"], true);
    let response = app
        .get(&format!("/api/data-collection/activities/{unused}"), &app.admin)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn activities_are_scoped_to_the_team() {
    let app = TestApp::new().await;
    let activity_id = create_activity(&app).await;

    let response = app
        .get(&format!("/api/data-collection/activities/{activity_id}"), &app.outsider)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/api/data-collection/activities", &app.outsider).await;
    assert!(response_json(response).await.as_array().unwrap().is_empty());
}
