use super::common::success_response;
use crate::{
    auth::TeamScope,
    errors::{ErrorResponse, ServiceError},
    services::users::TeamMemberView,
    AppState,
};
use axum::{extract::State, response::Response, routing::get, Router};

pub fn users_routes() -> Router<AppState> {
    Router::new().route("/", get(list_users))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Members of the selected team", body = Vec<TeamMemberView>),
        (status = 400, description = "No team selected", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    scope: TeamScope,
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let members = state
        .services
        .users
        .list_team_members(scope.team_id)
        .await?;
    Ok(success_response(members))
}
