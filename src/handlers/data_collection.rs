use super::common::{
    created_response, no_content_response, success_response, AppJson, AppPath, AppQuery,
};
use crate::{
    auth::TeamScope,
    entities::{data_collection, data_collection_activity, routing_operation_activity},
    errors::{ErrorResponse, ServiceError},
    services::data_collection::{ActivityInput, AssignInput, CollectInput},
    AppState,
};
use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub fn data_collection_routes() -> Router<AppState> {
    Router::new()
        .route("/activities", get(list_activities).post(create_activity))
        .route(
            "/activities/:id",
            get(get_activity)
                .put(update_activity)
                .delete(delete_activity),
        )
        .route("/assign", post(assign_activity).delete(unassign_activity))
        .route("/collect", post(collect_data).get(list_collections))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ActivityListQuery {
    /// Only return active activities
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UnassignQuery {
    pub routing_operation_id: Option<Uuid>,
    pub data_collection_activity_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CollectionQuery {
    pub work_order_operation_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteActivityResponse {
    /// `false` when the activity had collected data and was deactivated instead
    pub deleted: bool,
}

#[utoipa::path(
    get,
    path = "/api/data-collection/activities",
    params(ActivityListQuery),
    responses(
        (status = 200, description = "Activity definitions", body = Vec<data_collection_activity::Model>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "data-collection"
)]
pub async fn list_activities(
    scope: TeamScope,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ActivityListQuery>,
) -> Result<Response, ServiceError> {
    let activities = state
        .services
        .data_collection
        .list_activities(scope.team_id, query.active_only)
        .await?;
    Ok(success_response(activities))
}

#[utoipa::path(
    post,
    path = "/api/data-collection/activities",
    request_body = ActivityInput,
    responses(
        (status = 201, description = "Activity created", body = data_collection_activity::Model),
        (status = 400, description = "Missing name or malformed fields", body = ErrorResponse)
    ),
    tag = "data-collection"
)]
pub async fn create_activity(
    scope: TeamScope,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ActivityInput>,
) -> Result<Response, ServiceError> {
    let activity = state
        .services
        .data_collection
        .create_activity(scope.team_id, payload)
        .await?;
    Ok(created_response(activity))
}

#[utoipa::path(
    get,
    path = "/api/data-collection/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity", body = data_collection_activity::Model),
        (status = 404, description = "Activity not found", body = ErrorResponse)
    ),
    tag = "data-collection"
)]
pub async fn get_activity(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    let activity = state
        .services
        .data_collection
        .get_activity(scope.team_id, id)
        .await?;
    Ok(success_response(activity))
}

#[utoipa::path(
    put,
    path = "/api/data-collection/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity ID")),
    request_body = ActivityInput,
    responses(
        (status = 200, description = "Activity updated", body = data_collection_activity::Model),
        (status = 400, description = "Malformed fields", body = ErrorResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse)
    ),
    tag = "data-collection"
)]
pub async fn update_activity(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ActivityInput>,
) -> Result<Response, ServiceError> {
    let activity = state
        .services
        .data_collection
        .update_activity(scope.team_id, id, payload)
        .await?;
    Ok(success_response(activity))
}

#[utoipa::path(
    delete,
    path = "/api/data-collection/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity deleted or deactivated", body = DeleteActivityResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse)
    ),
    tag = "data-collection"
)]
pub async fn delete_activity(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    let deleted = state
        .services
        .data_collection
        .delete_activity(scope.team_id, id)
        .await?;
    Ok(success_response(DeleteActivityResponse { deleted }))
}

#[utoipa::path(
    post,
    path = "/api/data-collection/assign",
    request_body = AssignInput,
    responses(
        (status = 201, description = "Activity assigned", body = routing_operation_activity::Model),
        (status = 200, description = "Existing assignment updated", body = routing_operation_activity::Model),
        (status = 400, description = "Missing ids", body = ErrorResponse),
        (status = 404, description = "Operation or activity not found", body = ErrorResponse)
    ),
    tag = "data-collection"
)]
pub async fn assign_activity(
    scope: TeamScope,
    State(state): State<AppState>,
    AppJson(payload): AppJson<AssignInput>,
) -> Result<Response, ServiceError> {
    let (link, created) = state
        .services
        .data_collection
        .assign(scope.team_id, payload)
        .await?;
    Ok(if created {
        created_response(link)
    } else {
        success_response(link)
    })
}

#[utoipa::path(
    delete,
    path = "/api/data-collection/assign",
    params(UnassignQuery),
    responses(
        (status = 204, description = "Assignment removed"),
        (status = 400, description = "Missing ids", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    tag = "data-collection"
)]
pub async fn unassign_activity(
    scope: TeamScope,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UnassignQuery>,
) -> Result<Response, ServiceError> {
    state
        .services
        .data_collection
        .unassign(
            scope.team_id,
            query.routing_operation_id,
            query.data_collection_activity_id,
        )
        .await?;
    Ok(no_content_response())
}

#[utoipa::path(
    post,
    path = "/api/data-collection/collect",
    request_body = CollectInput,
    responses(
        (status = 201, description = "Data recorded", body = data_collection::Model),
        (status = 400, description = "Invalid or incomplete data", body = ErrorResponse),
        (status = 404, description = "Operation or activity not found", body = ErrorResponse)
    ),
    tag = "data-collection"
)]
pub async fn collect_data(
    scope: TeamScope,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CollectInput>,
) -> Result<Response, ServiceError> {
    let collection = state
        .services
        .data_collection
        .collect(scope.team_id, scope.user_id, payload)
        .await?;
    Ok(created_response(collection))
}

#[utoipa::path(
    get,
    path = "/api/data-collection/collect",
    params(CollectionQuery),
    responses(
        (status = 200, description = "Data collected for the operation", body = Vec<data_collection::Model>),
        (status = 400, description = "workOrderOperationId missing", body = ErrorResponse),
        (status = 404, description = "Operation not found", body = ErrorResponse)
    ),
    tag = "data-collection"
)]
pub async fn list_collections(
    scope: TeamScope,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CollectionQuery>,
) -> Result<Response, ServiceError> {
    let collections = state
        .services
        .data_collection
        .list_collections(scope.team_id, query.work_order_operation_id)
        .await?;
    Ok(success_response(collections))
}
