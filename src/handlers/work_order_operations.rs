use super::common::{created_response, success_response, AppJson, AppPath, AppQuery};
use crate::{
    auth::TeamScope,
    entities::{
        data_collection,
        file_record::FileRecord,
        work_order_operation::{self, WooStatus},
    },
    errors::{ErrorResponse, ServiceError},
    services::{
        data_collection::{CollectInput, WooDataCollection},
        routings::AttachmentInput,
        work_order_operations::{CompleteInput, PauseInput, UpdateWooInput, WooFilter},
    },
    AppState,
};
use axum::{
    extract::State,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub fn work_order_operations_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_work_order_operations))
        .route(
            "/:id",
            get(get_work_order_operation).put(update_work_order_operation),
        )
        .route("/:id/start", post(start_work_order_operation))
        .route("/:id/pause", post(pause_work_order_operation))
        .route("/:id/resume", post(resume_work_order_operation))
        .route("/:id/complete", post(complete_work_order_operation))
        .route("/:id/attachments", get(list_attachments).post(add_attachment))
        .route("/:id/attachments/:file_id", delete(remove_attachment))
        .route(
            "/:id/data-collection",
            get(get_data_collection).post(collect_data),
        )
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WooListQuery {
    pub order_id: Option<Uuid>,
    #[param(value_type = Option<String>)]
    pub status: Option<WooStatus>,
}

/// Collected values for one activity; the operation comes from the path
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WooCollectRequest {
    pub data_collection_activity_id: Option<Uuid>,
    #[schema(value_type = Object)]
    pub data: Option<Value>,
}

#[utoipa::path(
    get,
    path = "/api/work-order-operations",
    params(WooListQuery),
    responses(
        (status = 200, description = "Work order operations", body = Vec<work_order_operation::Model>),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn list_work_order_operations(
    scope: TeamScope,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<WooListQuery>,
) -> Result<Response, ServiceError> {
    let filter = WooFilter {
        order_id: query.order_id,
        status: query.status,
    };
    let operations = state
        .services
        .work_order_operations
        .list(scope.team_id, filter)
        .await?;
    Ok(success_response(operations))
}

#[utoipa::path(
    get,
    path = "/api/work-order-operations/{id}",
    params(("id" = Uuid, Path, description = "Work order operation ID")),
    responses(
        (status = 200, description = "Work order operation", body = work_order_operation::Model),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn get_work_order_operation(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    let woo = state
        .services
        .work_order_operations
        .get(scope.team_id, id)
        .await?;
    Ok(success_response(woo))
}

#[utoipa::path(
    put,
    path = "/api/work-order-operations/{id}",
    params(("id" = Uuid, Path, description = "Work order operation ID")),
    request_body = UpdateWooInput,
    responses(
        (status = 200, description = "Work order operation updated", body = work_order_operation::Model),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn update_work_order_operation(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateWooInput>,
) -> Result<Response, ServiceError> {
    let woo = state
        .services
        .work_order_operations
        .update(scope.team_id, id, payload)
        .await?;
    Ok(success_response(woo))
}

#[utoipa::path(
    post,
    path = "/api/work-order-operations/{id}/start",
    params(("id" = Uuid, Path, description = "Work order operation ID")),
    responses(
        (status = 200, description = "Operation started", body = work_order_operation::Model),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Operation is not pending", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn start_work_order_operation(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    let woo = state
        .services
        .work_order_operations
        .start(scope.team_id, id, scope.user_id)
        .await?;
    Ok(success_response(woo))
}

#[utoipa::path(
    post,
    path = "/api/work-order-operations/{id}/pause",
    params(("id" = Uuid, Path, description = "Work order operation ID")),
    request_body = PauseInput,
    responses(
        (status = 200, description = "Operation paused", body = work_order_operation::Model),
        (status = 400, description = "pauseReasonId missing", body = ErrorResponse),
        (status = 404, description = "Operation or pause reason not found", body = ErrorResponse),
        (status = 409, description = "Operation is not in progress", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn pause_work_order_operation(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<PauseInput>,
) -> Result<Response, ServiceError> {
    let woo = state
        .services
        .work_order_operations
        .pause(scope.team_id, id, scope.user_id, payload)
        .await?;
    Ok(success_response(woo))
}

#[utoipa::path(
    post,
    path = "/api/work-order-operations/{id}/resume",
    params(("id" = Uuid, Path, description = "Work order operation ID")),
    responses(
        (status = 200, description = "Operation resumed", body = work_order_operation::Model),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Operation is not paused", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn resume_work_order_operation(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    let woo = state
        .services
        .work_order_operations
        .resume(scope.team_id, id)
        .await?;
    Ok(success_response(woo))
}

#[utoipa::path(
    post,
    path = "/api/work-order-operations/{id}/complete",
    params(("id" = Uuid, Path, description = "Work order operation ID")),
    request_body = CompleteInput,
    responses(
        (status = 200, description = "Operation completed", body = work_order_operation::Model),
        (status = 400, description = "Invalid quantities or captured data", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Operation is not in progress", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn complete_work_order_operation(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CompleteInput>,
) -> Result<Response, ServiceError> {
    let woo = state
        .services
        .work_order_operations
        .complete(scope.team_id, id, payload)
        .await?;
    Ok(success_response(woo))
}

#[utoipa::path(
    get,
    path = "/api/work-order-operations/{id}/attachments",
    params(("id" = Uuid, Path, description = "Work order operation ID")),
    responses(
        (status = 200, description = "Attachments", body = Vec<FileRecord>),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn list_attachments(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    let attachments = state
        .services
        .work_order_operations
        .list_attachments(scope.team_id, id)
        .await?;
    Ok(success_response(attachments))
}

#[utoipa::path(
    post,
    path = "/api/work-order-operations/{id}/attachments",
    params(("id" = Uuid, Path, description = "Work order operation ID")),
    request_body = AttachmentInput,
    responses(
        (status = 201, description = "Attachment list after the add", body = Vec<FileRecord>),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn add_attachment(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<AttachmentInput>,
) -> Result<Response, ServiceError> {
    payload.validate()?;
    let attachments = state
        .services
        .work_order_operations
        .add_attachment(scope.team_id, id, payload.into_record(Some(scope.user_id)))
        .await?;
    Ok(created_response(attachments))
}

#[utoipa::path(
    delete,
    path = "/api/work-order-operations/{id}/attachments/{file_id}",
    params(
        ("id" = Uuid, Path, description = "Work order operation ID"),
        ("file_id" = String, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "Remaining attachments", body = Vec<FileRecord>),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn remove_attachment(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath((id, file_id)): AppPath<(Uuid, String)>,
) -> Result<Response, ServiceError> {
    let attachments = state
        .services
        .work_order_operations
        .remove_attachment(scope.team_id, id, &file_id)
        .await?;
    Ok(success_response(attachments))
}

#[utoipa::path(
    get,
    path = "/api/work-order-operations/{id}/data-collection",
    params(("id" = Uuid, Path, description = "Work order operation ID")),
    responses(
        (status = 200, description = "Assigned activities and collected data", body = WooDataCollection),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn get_data_collection(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    let view = state
        .services
        .data_collection
        .for_work_order_operation(scope.team_id, id)
        .await?;
    Ok(success_response(view))
}

#[utoipa::path(
    post,
    path = "/api/work-order-operations/{id}/data-collection",
    params(("id" = Uuid, Path, description = "Work order operation ID")),
    request_body = WooCollectRequest,
    responses(
        (status = 201, description = "Data recorded", body = data_collection::Model),
        (status = 400, description = "Invalid or incomplete data", body = ErrorResponse),
        (status = 404, description = "Operation or activity not found", body = ErrorResponse)
    ),
    tag = "work-order-operations"
)]
pub async fn collect_data(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<WooCollectRequest>,
) -> Result<Response, ServiceError> {
    let input = CollectInput {
        work_order_operation_id: Some(id),
        data_collection_activity_id: payload.data_collection_activity_id,
        data: payload.data,
    };
    let collection = state
        .services
        .data_collection
        .collect(scope.team_id, scope.user_id, input)
        .await?;
    Ok(created_response(collection))
}
