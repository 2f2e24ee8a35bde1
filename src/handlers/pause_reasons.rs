use super::common::{
    created_response, success_response, AppJson, AppPath, AppQuery, DateRangeQuery,
};
use crate::{
    auth::{SessionUser, TeamScope},
    entities::pause_reason,
    errors::{ErrorResponse, ServiceError},
    services::{
        pause_reasons::{DeleteOutcome, PauseCategoryInfo, PauseReasonInput, PauseReasonUsage},
        PauseReasonService,
    },
    AppState,
};
use axum::{extract::State, response::Response, routing::get, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub fn pause_reasons_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pause_reasons).post(create_pause_reason))
        .route("/categories", get(list_categories))
        .route("/usage", get(pause_reason_usage))
        .route(
            "/:id",
            axum::routing::put(update_pause_reason).delete(delete_pause_reason),
        )
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PauseReasonListQuery {
    /// Include deactivated reasons
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletePauseReasonResponse {
    pub result: DeleteOutcome,
}

#[utoipa::path(
    get,
    path = "/api/pause-reasons",
    params(PauseReasonListQuery),
    responses(
        (status = 200, description = "Pause reasons of the selected team", body = Vec<pause_reason::Model>),
        (status = 400, description = "No team selected", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "pause-reasons"
)]
pub async fn list_pause_reasons(
    scope: TeamScope,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PauseReasonListQuery>,
) -> Result<Response, ServiceError> {
    let reasons = state
        .services
        .pause_reasons
        .list(scope.team_id, query.include_inactive)
        .await?;
    Ok(success_response(reasons))
}

#[utoipa::path(
    post,
    path = "/api/pause-reasons",
    request_body = PauseReasonInput,
    responses(
        (status = 201, description = "Pause reason created", body = pause_reason::Model),
        (status = 400, description = "Missing name or unknown category", body = ErrorResponse)
    ),
    tag = "pause-reasons"
)]
pub async fn create_pause_reason(
    scope: TeamScope,
    State(state): State<AppState>,
    AppJson(payload): AppJson<PauseReasonInput>,
) -> Result<Response, ServiceError> {
    let reason = state
        .services
        .pause_reasons
        .create(scope.team_id, payload)
        .await?;
    Ok(created_response(reason))
}

#[utoipa::path(
    put,
    path = "/api/pause-reasons/{id}",
    params(("id" = Uuid, Path, description = "Pause reason ID")),
    request_body = PauseReasonInput,
    responses(
        (status = 200, description = "Pause reason updated", body = pause_reason::Model),
        (status = 404, description = "Pause reason not found", body = ErrorResponse)
    ),
    tag = "pause-reasons"
)]
pub async fn update_pause_reason(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<PauseReasonInput>,
) -> Result<Response, ServiceError> {
    let reason = state
        .services
        .pause_reasons
        .update(scope.team_id, id, payload)
        .await?;
    Ok(success_response(reason))
}

#[utoipa::path(
    delete,
    path = "/api/pause-reasons/{id}",
    params(("id" = Uuid, Path, description = "Pause reason ID")),
    responses(
        (status = 200, description = "Deleted, or deactivated when pause history references it", body = DeletePauseReasonResponse),
        (status = 404, description = "Pause reason not found", body = ErrorResponse)
    ),
    tag = "pause-reasons"
)]
pub async fn delete_pause_reason(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    let result = state
        .services
        .pause_reasons
        .delete(scope.team_id, id)
        .await?;
    Ok(success_response(DeletePauseReasonResponse { result }))
}

#[utoipa::path(
    get,
    path = "/api/pause-reasons/categories",
    responses(
        (status = 200, description = "The fixed pause categories", body = Vec<PauseCategoryInfo>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "pause-reasons"
)]
pub async fn list_categories(_user: SessionUser) -> Result<Response, ServiceError> {
    Ok(success_response(PauseReasonService::categories()))
}

#[utoipa::path(
    get,
    path = "/api/pause-reasons/usage",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Pause counts and durations per reason", body = Vec<PauseReasonUsage>),
        (status = 400, description = "Invalid date", body = ErrorResponse)
    ),
    tag = "pause-reasons"
)]
pub async fn pause_reason_usage(
    scope: TeamScope,
    State(state): State<AppState>,
    AppQuery(range): AppQuery<DateRangeQuery>,
) -> Result<Response, ServiceError> {
    let (start, end) = range.resolve()?;
    let usage = state
        .services
        .pause_reasons
        .usage(scope.team_id, start, end)
        .await?;
    Ok(success_response(usage))
}
