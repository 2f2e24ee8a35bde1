use super::common::{created_response, success_response, AppJson, AppPath};
use crate::{
    auth::SessionUser,
    entities::{api_key, team_member::MemberRole},
    errors::{ErrorResponse, ServiceError},
    services::api_keys::{CreateApiKeyInput, CreatedApiKey},
    AppState,
};
use axum::{extract::State, response::Response, routing::get, Router};
use tracing::warn;
use uuid::Uuid;

pub fn api_keys_routes() -> Router<AppState> {
    Router::new()
        .route("/:team_id/api-keys", get(list_api_keys).post(create_api_key))
        .route(
            "/:team_id/api-keys/:id",
            get(get_api_key).delete(revoke_api_key),
        )
}

/// Key management is limited to admins of the team named in the path.
/// Non-members see the team as absent.
async fn require_team_admin(
    state: &AppState,
    user: &SessionUser,
    team_id: Uuid,
) -> Result<(), ServiceError> {
    let membership = state
        .services
        .users
        .membership(team_id, user.user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team"))?;

    if membership.role != MemberRole::Admin {
        warn!(user_id = %user.user_id, team_id = %team_id, "non-admin api key access");
        return Err(ServiceError::Forbidden(
            "Team admin role required".to_string(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/api-keys",
    params(("team_id" = Uuid, Path, description = "Team ID")),
    responses(
        (status = 200, description = "API keys of the team (never the secret)", body = Vec<api_key::Model>),
        (status = 403, description = "Caller is not a team admin", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "api-keys"
)]
pub async fn list_api_keys(
    user: SessionUser,
    State(state): State<AppState>,
    AppPath(team_id): AppPath<Uuid>,
) -> Result<Response, ServiceError> {
    require_team_admin(&state, &user, team_id).await?;
    let keys = state.services.api_keys.list(team_id).await?;
    Ok(success_response(keys))
}

#[utoipa::path(
    post,
    path = "/api/teams/{team_id}/api-keys",
    params(("team_id" = Uuid, Path, description = "Team ID")),
    request_body = CreateApiKeyInput,
    responses(
        (status = 201, description = "API key created; the plaintext is only returned here", body = CreatedApiKey),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller is not a team admin", body = ErrorResponse)
    ),
    tag = "api-keys"
)]
pub async fn create_api_key(
    user: SessionUser,
    State(state): State<AppState>,
    AppPath(team_id): AppPath<Uuid>,
    AppJson(payload): AppJson<CreateApiKeyInput>,
) -> Result<Response, ServiceError> {
    require_team_admin(&state, &user, team_id).await?;
    let created = state
        .services
        .api_keys
        .create(team_id, user.user_id, payload)
        .await?;
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}/api-keys/{id}",
    params(
        ("team_id" = Uuid, Path, description = "Team ID"),
        ("id" = Uuid, Path, description = "API key ID")
    ),
    responses(
        (status = 200, description = "API key", body = api_key::Model),
        (status = 403, description = "Caller is not a team admin", body = ErrorResponse),
        (status = 404, description = "API key not found", body = ErrorResponse)
    ),
    tag = "api-keys"
)]
pub async fn get_api_key(
    user: SessionUser,
    State(state): State<AppState>,
    AppPath((team_id, id)): AppPath<(Uuid, Uuid)>,
) -> Result<Response, ServiceError> {
    require_team_admin(&state, &user, team_id).await?;
    let key = state.services.api_keys.get(team_id, id).await?;
    Ok(success_response(key))
}

#[utoipa::path(
    delete,
    path = "/api/teams/{team_id}/api-keys/{id}",
    params(
        ("team_id" = Uuid, Path, description = "Team ID"),
        ("id" = Uuid, Path, description = "API key ID")
    ),
    responses(
        (status = 200, description = "API key revoked", body = api_key::Model),
        (status = 403, description = "Caller is not a team admin", body = ErrorResponse),
        (status = 404, description = "API key not found", body = ErrorResponse)
    ),
    tag = "api-keys"
)]
pub async fn revoke_api_key(
    user: SessionUser,
    State(state): State<AppState>,
    AppPath((team_id, id)): AppPath<(Uuid, Uuid)>,
) -> Result<Response, ServiceError> {
    require_team_admin(&state, &user, team_id).await?;
    let key = state.services.api_keys.revoke(team_id, id).await?;
    Ok(success_response(key))
}
