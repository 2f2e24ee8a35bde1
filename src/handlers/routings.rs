use super::common::{created_response, no_content_response, success_response, AppJson, AppPath};
use crate::{
    auth::TeamScope,
    entities::{file_record::FileRecord, routing, routing_operation},
    errors::{ErrorResponse, ServiceError},
    services::routings::{
        AttachmentInput, CreateRoutingInput, OperationInput, RoutingDetail, UpdateOperationInput,
        UpdateRoutingInput,
    },
    AppState,
};
use axum::{
    extract::State,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;
use validator::Validate;

pub fn routings_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_routings).post(create_routing))
        .route("/:id", get(get_routing).put(update_routing))
        .route("/:id/operations", post(add_operation))
        .route(
            "/:id/operations/:operation_id",
            put(update_operation).delete(delete_operation),
        )
        .route(
            "/:id/operations/:operation_id/attachments",
            post(add_operation_attachment),
        )
        .route(
            "/:id/operations/:operation_id/attachments/:file_id",
            delete(remove_operation_attachment),
        )
}

#[utoipa::path(
    get,
    path = "/api/routings",
    responses(
        (status = 200, description = "Routings of the selected team", body = Vec<routing::Model>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "routings"
)]
pub async fn list_routings(
    scope: TeamScope,
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let routings = state.services.routings.list(scope.team_id).await?;
    Ok(success_response(routings))
}

#[utoipa::path(
    post,
    path = "/api/routings",
    request_body = CreateRoutingInput,
    responses(
        (status = 201, description = "Routing created", body = RoutingDetail),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "routings"
)]
pub async fn create_routing(
    scope: TeamScope,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateRoutingInput>,
) -> Result<Response, ServiceError> {
    let routing = state.services.routings.create(scope.team_id, payload).await?;
    Ok(created_response(routing))
}

#[utoipa::path(
    get,
    path = "/api/routings/{id}",
    params(("id" = Uuid, Path, description = "Routing ID")),
    responses(
        (status = 200, description = "Routing with operations and assigned activities", body = RoutingDetail),
        (status = 404, description = "Routing not found", body = ErrorResponse)
    ),
    tag = "routings"
)]
pub async fn get_routing(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    let routing = state.services.routings.get(scope.team_id, id).await?;
    Ok(success_response(routing))
}

#[utoipa::path(
    put,
    path = "/api/routings/{id}",
    params(("id" = Uuid, Path, description = "Routing ID")),
    request_body = UpdateRoutingInput,
    responses(
        (status = 200, description = "Routing updated", body = routing::Model),
        (status = 404, description = "Routing not found", body = ErrorResponse)
    ),
    tag = "routings"
)]
pub async fn update_routing(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateRoutingInput>,
) -> Result<Response, ServiceError> {
    let routing = state
        .services
        .routings
        .update(scope.team_id, id, payload)
        .await?;
    Ok(success_response(routing))
}

#[utoipa::path(
    post,
    path = "/api/routings/{id}/operations",
    params(("id" = Uuid, Path, description = "Routing ID")),
    request_body = OperationInput,
    responses(
        (status = 201, description = "Operation added", body = routing_operation::Model),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Routing not found", body = ErrorResponse)
    ),
    tag = "routings"
)]
pub async fn add_operation(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<OperationInput>,
) -> Result<Response, ServiceError> {
    let operation = state
        .services
        .routings
        .add_operation(scope.team_id, id, payload)
        .await?;
    Ok(created_response(operation))
}

#[utoipa::path(
    put,
    path = "/api/routings/{id}/operations/{operation_id}",
    params(
        ("id" = Uuid, Path, description = "Routing ID"),
        ("operation_id" = Uuid, Path, description = "Routing operation ID")
    ),
    request_body = UpdateOperationInput,
    responses(
        (status = 200, description = "Operation updated", body = routing_operation::Model),
        (status = 404, description = "Routing or operation not found", body = ErrorResponse)
    ),
    tag = "routings"
)]
pub async fn update_operation(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath((id, operation_id)): AppPath<(Uuid, Uuid)>,
    AppJson(payload): AppJson<UpdateOperationInput>,
) -> Result<Response, ServiceError> {
    let operation = state
        .services
        .routings
        .update_operation(scope.team_id, id, operation_id, payload)
        .await?;
    Ok(success_response(operation))
}

#[utoipa::path(
    delete,
    path = "/api/routings/{id}/operations/{operation_id}",
    params(
        ("id" = Uuid, Path, description = "Routing ID"),
        ("operation_id" = Uuid, Path, description = "Routing operation ID")
    ),
    responses(
        (status = 204, description = "Operation deleted"),
        (status = 404, description = "Routing or operation not found", body = ErrorResponse),
        (status = 409, description = "Operation is used by work order operations", body = ErrorResponse)
    ),
    tag = "routings"
)]
pub async fn delete_operation(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath((id, operation_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Response, ServiceError> {
    state
        .services
        .routings
        .delete_operation(scope.team_id, id, operation_id)
        .await?;
    Ok(no_content_response())
}

#[utoipa::path(
    post,
    path = "/api/routings/{id}/operations/{operation_id}/attachments",
    params(
        ("id" = Uuid, Path, description = "Routing ID"),
        ("operation_id" = Uuid, Path, description = "Routing operation ID")
    ),
    request_body = AttachmentInput,
    responses(
        (status = 201, description = "Attachment list after the add", body = Vec<FileRecord>),
        (status = 404, description = "Routing or operation not found", body = ErrorResponse)
    ),
    tag = "routings"
)]
pub async fn add_operation_attachment(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath((id, operation_id)): AppPath<(Uuid, Uuid)>,
    AppJson(payload): AppJson<AttachmentInput>,
) -> Result<Response, ServiceError> {
    payload.validate()?;
    let attachments = state
        .services
        .routings
        .add_operation_attachment(
            scope.team_id,
            id,
            operation_id,
            payload.into_record(Some(scope.user_id)),
        )
        .await?;
    Ok(created_response(attachments))
}

#[utoipa::path(
    delete,
    path = "/api/routings/{id}/operations/{operation_id}/attachments/{file_id}",
    params(
        ("id" = Uuid, Path, description = "Routing ID"),
        ("operation_id" = Uuid, Path, description = "Routing operation ID"),
        ("file_id" = String, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "Remaining attachments", body = Vec<FileRecord>),
        (status = 404, description = "Routing or operation not found", body = ErrorResponse)
    ),
    tag = "routings"
)]
pub async fn remove_operation_attachment(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath((id, operation_id, file_id)): AppPath<(Uuid, Uuid, String)>,
) -> Result<Response, ServiceError> {
    let attachments = state
        .services
        .routings
        .remove_operation_attachment(scope.team_id, id, operation_id, &file_id)
        .await?;
    Ok(success_response(attachments))
}
