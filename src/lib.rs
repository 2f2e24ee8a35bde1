//! MES API library
//!
//! Production orders, routings, the work-order-operation lifecycle, pause reasons,
//! data collection, attachments and a rate-limited external API, served over axum.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod rate_limiter;
pub mod services;
pub mod tracing;

use crate::auth::{IdentityResolver, JwtIdentityResolver};
use crate::rate_limiter::{RateLimitError, RateLimiter};
use crate::services::AppServices;
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: AppServices,
    pub identity: Arc<dyn IdentityResolver>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Builds services, the JWT session resolver and the configured rate limiter.
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Result<Self, RateLimitError> {
        let services = AppServices::new(db.clone(), &config);
        let identity: Arc<dyn IdentityResolver> =
            Arc::new(JwtIdentityResolver::from_app_config(&config));
        let rate_limiter = RateLimiter::from_app_config(&config)?;

        Ok(Self {
            db,
            config,
            services,
            identity,
            rate_limiter,
        })
    }
}

/// Full application router: `/api`, `/api/v1`, `/health` and the API docs.
/// CORS is left to the binary since it depends on deployment.
pub fn app_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs.max(1));

    Router::new()
        .nest("/api/v1", handlers::external::api_v1_routes())
        .nest("/api", handlers::api_routes())
        .nest("/health", handlers::health::health_routes())
        .merge(openapi::swagger_ui())
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
