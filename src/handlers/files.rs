use super::common::AppPath;
use crate::{
    auth::SessionUser,
    errors::{ErrorResponse, ServiceError},
    AppState,
};
use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::debug;

pub fn files_routes() -> Router<AppState> {
    Router::new().route("/download/:id", get(download_file))
}

#[utoipa::path(
    get,
    path = "/api/files/download/{id}",
    params(("id" = String, Path, description = "Stored file ID, without extension")),
    responses(
        (status = 200, description = "Raw file bytes", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No stored file with a known extension", body = ErrorResponse)
    ),
    tag = "files"
)]
pub async fn download_file(
    user: SessionUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> Result<Response, ServiceError> {
    let file = state
        .services
        .files
        .download(&id)
        .await?
        .ok_or_else(|| ServiceError::not_found("File"))?;

    debug!(user_id = %user.user_id, file = %file.filename, "file download");
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.filename))
        .map_err(|_| ServiceError::InternalError("Invalid file name".to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
