//! `/api/v1`: read-only endpoints for integrations, authenticated by team API key.
//! Every response, success or error, carries the caller's rate-limit headers.

use super::common::DateRangeQuery;
use crate::{
    auth::ExternalContext,
    entities::data_collection_activity,
    errors::{ExternalApiError, ExternalErrorBody, ServiceError},
    services::{
        analytics::{PerformanceSummary, WipSummary},
        routings::RoutingDetail,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/performance", get(performance))
        .route("/analytics/wip", get(wip))
        .route("/data-collection/activities", get(list_activities))
        .route("/routings/:routing_id", get(get_routing))
}

/// Success envelope of the external API
#[derive(Debug, Serialize, ToSchema)]
pub struct ExternalResponse<T> {
    pub data: T,
}

fn ok<T: Serialize>(data: T) -> Response {
    Json(ExternalResponse { data }).into_response()
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/performance",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Performance for the window", body = ExternalResponse<PerformanceSummary>),
        (status = 400, description = "Invalid date", body = ExternalErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ExternalErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ExternalErrorBody)
    ),
    security(("api_key" = [])),
    tag = "external"
)]
pub async fn performance(
    ctx: ExternalContext,
    State(state): State<AppState>,
    range: Option<Query<DateRangeQuery>>,
) -> Response {
    let outcome = async {
        let Query(range) = range.ok_or_else(|| {
            ExternalApiError::validation("Invalid query parameters")
        })?;
        let (start, end) = range.resolve()?;
        let summary = state
            .services
            .analytics
            .performance(ctx.team_id, start, end)
            .await?;
        Ok::<_, ExternalApiError>(ok(summary))
    }
    .await;
    ctx.respond(outcome)
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/wip",
    responses(
        (status = 200, description = "Work in progress", body = ExternalResponse<WipSummary>),
        (status = 401, description = "Missing or invalid API key", body = ExternalErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ExternalErrorBody)
    ),
    security(("api_key" = [])),
    tag = "external"
)]
pub async fn wip(ctx: ExternalContext, State(state): State<AppState>) -> Response {
    let outcome = state
        .services
        .analytics
        .wip(ctx.team_id)
        .await
        .map(ok)
        .map_err(ExternalApiError::from);
    ctx.respond(outcome)
}

#[utoipa::path(
    get,
    path = "/api/v1/data-collection/activities",
    responses(
        (status = 200, description = "Active activity definitions", body = ExternalResponse<Vec<data_collection_activity::Model>>),
        (status = 401, description = "Missing or invalid API key", body = ExternalErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ExternalErrorBody)
    ),
    security(("api_key" = [])),
    tag = "external"
)]
pub async fn list_activities(ctx: ExternalContext, State(state): State<AppState>) -> Response {
    let outcome = state
        .services
        .data_collection
        .list_activities(ctx.team_id, true)
        .await
        .map(ok)
        .map_err(ExternalApiError::from);
    ctx.respond(outcome)
}

#[utoipa::path(
    get,
    path = "/api/v1/routings/{routing_id}",
    params(("routing_id" = Uuid, Path, description = "Routing ID")),
    responses(
        (status = 200, description = "Routing with operations", body = ExternalResponse<RoutingDetail>),
        (status = 400, description = "Malformed routing id", body = ExternalErrorBody),
        (status = 404, description = "Routing not found", body = ExternalErrorBody)
    ),
    security(("api_key" = [])),
    tag = "external"
)]
pub async fn get_routing(
    ctx: ExternalContext,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    let outcome = async {
        let id = Uuid::parse_str(&raw_id)
            .map_err(|_| ExternalApiError::validation("routingId must be a UUID"))?;
        match state.services.routings.get(ctx.team_id, id).await {
            Ok(routing) => Ok(ok(routing)),
            Err(ServiceError::NotFound(_)) => Err(ExternalApiError::RoutingNotFound),
            Err(other) => Err(ExternalApiError::from(other)),
        }
    }
    .await;
    ctx.respond(outcome)
}
