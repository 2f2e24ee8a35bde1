//! HTTP handlers. Each handler resolves the caller, makes one service call and
//! shapes the response; all persistence goes through [`crate::services`].

pub mod api_keys;
pub mod common;
pub mod data_collection;
pub mod external;
pub mod files;
pub mod health;
pub mod orders;
pub mod pause_reasons;
pub mod routings;
pub mod users;
pub mod work_order_operations;

use crate::AppState;
use axum::Router;

/// Session-authenticated API, mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/data-collection", data_collection::data_collection_routes())
        .nest("/files", files::files_routes())
        .nest("/orders", orders::orders_routes())
        .nest("/pause-reasons", pause_reasons::pause_reasons_routes())
        .nest("/routings", routings::routings_routes())
        .nest("/teams", api_keys::api_keys_routes())
        .nest("/users", users::users_routes())
        .nest(
            "/work-order-operations",
            work_order_operations::work_order_operations_routes(),
        )
}
