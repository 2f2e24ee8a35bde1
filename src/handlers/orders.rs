use super::common::{created_response, success_response, AppJson, AppPath};
use crate::{
    auth::TeamScope,
    entities::order,
    errors::{ErrorResponse, ServiceError},
    services::orders::{CreateOrderInput, OrderDetail},
    AppState,
};
use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

pub fn orders_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order))
        .route("/:id/complete", post(complete_order))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Orders of the selected team", body = Vec<order::Model>),
        (status = 400, description = "No team selected", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn list_orders(
    scope: TeamScope,
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let orders = state.services.orders.list(scope.team_id).await?;
    Ok(success_response(orders))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderInput,
    responses(
        (status = 201, description = "Order created with its operations", body = OrderDetail),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Routing not found", body = ErrorResponse),
        (status = 409, description = "Order number already used", body = ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn create_order(
    scope: TeamScope,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateOrderInput>,
) -> Result<Response, ServiceError> {
    let order = state.services.orders.create(scope.team_id, payload).await?;
    Ok(created_response(order))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its operations", body = OrderDetail),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    let order = state.services.orders.get(scope.team_id, id).await?;
    Ok(success_response(order))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/complete",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order completed", body = order::Model),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 409, description = "Order already completed or cancelled", body = ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn complete_order(
    scope: TeamScope,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    let order = state
        .services
        .orders
        .complete_order(scope.team_id, id)
        .await?;
    Ok(success_response(order))
}
