use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;
use utoipa::ToSchema;

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
    Degraded,
}

/// Individual component health details
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Full health check response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub version: String,
    pub timestamp: String,
    pub uptime_secs: u64,
    pub database: ComponentHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<ComponentHealth>,
}

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Records the process start for uptime reporting
pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

fn uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

/// Liveness: the process is serving requests
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is running")),
    tag = "health"
)]
pub async fn liveness_check() -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Readiness: the database answers a ping
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Ready for traffic"),
        (status = 503, description = "Database unavailable")
    ),
    tag = "health"
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match crate::db::check_connection(&state.db).await {
        Ok(latency) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "database": { "status": "up", "latencyMs": latency.as_millis() as u64 }
            })),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "database": { "status": "down" }
            })),
        ),
    }
}

/// Database plus, when the rate limiter uses it, Redis
#[utoipa::path(
    get,
    path = "/health/detailed",
    responses(
        (status = 200, description = "All components up or degraded", body = HealthResponse),
        (status = 503, description = "Database unavailable", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn detailed_health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match crate::db::check_connection(&state.db).await {
        Ok(latency) => ComponentHealth {
            status: ComponentStatus::Up,
            message: "Connection successful".to_string(),
            latency_ms: Some(latency.as_millis() as u64),
        },
        Err(_) => ComponentHealth {
            status: ComponentStatus::Down,
            message: "Connection failed".to_string(),
            latency_ms: None,
        },
    };

    let redis = match state.config.redis_url.as_deref() {
        Some(url) if state.config.rate_limit_use_redis => {
            let started = Instant::now();
            let health = match check_redis_connection(url).await {
                Ok(()) => ComponentHealth {
                    status: ComponentStatus::Up,
                    message: "Connection successful".to_string(),
                    latency_ms: Some(started.elapsed().as_millis() as u64),
                },
                Err(e) => ComponentHealth {
                    status: ComponentStatus::Down,
                    message: e,
                    latency_ms: None,
                },
            };
            Some(health)
        }
        _ => None,
    };

    let status = match (database.status, redis.as_ref().map(|r| r.status)) {
        (ComponentStatus::Up, None | Some(ComponentStatus::Up)) => ComponentStatus::Up,
        (ComponentStatus::Up, _) => ComponentStatus::Degraded,
        _ => ComponentStatus::Down,
    };
    let code = if status == ComponentStatus::Down {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_secs: uptime_secs(),
            database,
            redis,
        }),
    )
}

async fn check_redis_connection(url: &str) -> Result<(), String> {
    let client = redis::Client::open(url).map_err(|e| format!("Invalid URL: {}", e))?;
    let mut conn = client
        .get_async_connection()
        .await
        .map_err(|e| format!("Failed to connect: {}", e))?;

    let _: String = redis::cmd("PING")
        .query_async(&mut conn)
        .await
        .map_err(|e| format!("Ping failed: {}", e))?;

    Ok(())
}

/// - `GET /health` liveness
/// - `GET /health/ready` database readiness
/// - `GET /health/detailed` per-component status
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness_check))
        .route("/ready", get(readiness_check))
        .route("/detailed", get(detailed_health_check))
}
