//! Team-scoped persistence services. Each service owns the tables it writes;
//! handlers never touch the database directly.

use crate::config::AppConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod analytics;
pub mod api_keys;
pub mod data_collection;
pub mod files;
pub mod orders;
pub mod pause_reasons;
pub mod routings;
pub mod users;
pub mod work_order_operations;

pub use analytics::AnalyticsService;
pub use api_keys::ApiKeyService;
pub use data_collection::DataCollectionService;
pub use files::FileStore;
pub use orders::OrderService;
pub use pause_reasons::PauseReasonService;
pub use routings::RoutingService;
pub use users::UserService;
pub use work_order_operations::WorkOrderOperationService;

/// Every service the router needs, built over one connection pool
#[derive(Clone)]
pub struct AppServices {
    pub analytics: AnalyticsService,
    pub api_keys: ApiKeyService,
    pub data_collection: DataCollectionService,
    pub files: FileStore,
    pub orders: OrderService,
    pub pause_reasons: PauseReasonService,
    pub routings: RoutingService,
    pub users: UserService,
    pub work_order_operations: WorkOrderOperationService,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, config: &AppConfig) -> Self {
        Self {
            analytics: AnalyticsService::new(db.clone()),
            api_keys: ApiKeyService::new(db.clone(), config.api_key_prefix.clone()),
            data_collection: DataCollectionService::new(db.clone()),
            files: FileStore::new(&config.upload_dir),
            orders: OrderService::new(db.clone()),
            pause_reasons: PauseReasonService::new(db.clone()),
            routings: RoutingService::new(db.clone()),
            users: UserService::new(db.clone()),
            work_order_operations: WorkOrderOperationService::new(db),
        }
    }
}
