//! Credential and rate-limit guard for the `/api/v1` surface.

use crate::{errors::ExternalApiError, rate_limiter::RateLimitResult, AppState};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Attaches `X-RateLimit-Limit`, `X-RateLimit-Remaining` and `X-RateLimit-Reset`
/// (epoch milliseconds) to a response.
pub fn with_rate_limit_headers(
    mut response: Response,
    limit: u32,
    remaining: u32,
    reset_at_ms: i64,
) -> Response {
    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT_HEADER, HeaderValue::from(limit));
    headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(remaining));
    headers.insert(RATE_LIMIT_RESET_HEADER, HeaderValue::from(reset_at_ms));
    response
}

fn presented_key(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    bearer
        .or_else(|| {
            headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        })
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Resolved external caller plus the rate-limit decision for this request
#[derive(Debug, Clone)]
pub struct ExternalContext {
    pub team_id: Uuid,
    pub api_key_id: Uuid,
    pub rate: RateLimitResult,
}

impl ExternalContext {
    /// Converts a handler outcome into a response carrying the caller's quota headers.
    pub fn respond(&self, outcome: impl IntoResponse) -> Response {
        with_rate_limit_headers(
            outcome.into_response(),
            self.rate.limit,
            self.rate.remaining,
            self.rate.reset_at_ms,
        )
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for ExternalContext {
    type Rejection = ExternalApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(key) = presented_key(&parts.headers) else {
            debug!("external request without api key");
            return Err(ExternalApiError::Unauthorized(
                "Missing API key".to_string(),
            ));
        };

        let record = state
            .services
            .api_keys
            .authenticate(&key)
            .await
            .map_err(|e| {
                error!(error = %e, "api key lookup failed");
                ExternalApiError::Internal
            })?
            .ok_or_else(|| ExternalApiError::Unauthorized("Invalid API key".to_string()))?;

        let rate = state
            .rate_limiter
            .check_rate_limit(&record.id.to_string())
            .await;
        if !rate.allowed {
            warn!(api_key_id = %record.id, "external rate limit exceeded");
            return Err(ExternalApiError::RateLimited {
                limit: rate.limit,
                reset_at_ms: rate.reset_at_ms,
            });
        }

        Ok(Self {
            team_id: record.team_id,
            api_key_id: record.id,
            rate,
        })
    }
}
