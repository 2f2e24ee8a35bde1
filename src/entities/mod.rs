//! Persisted MES records. Every table carries `team_id`; services filter on it.

pub mod api_key;
pub mod data_collection;
pub mod data_collection_activity;
pub mod file_record;
pub mod order;
pub mod pause_reason;
pub mod routing;
pub mod routing_operation;
pub mod routing_operation_activity;
pub mod team;
pub mod team_member;
pub mod user;
pub mod woo_pause_event;
pub mod work_order_operation;

pub use file_record::{FileRecord, FileRecordList};
