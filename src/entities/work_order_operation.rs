use super::file_record::FileRecordList;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of a work order operation
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WooStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "work_order_operations")]
#[serde(rename_all = "camelCase")]
#[schema(as = WorkOrderOperation)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub team_id: Uuid,
    pub order_id: Uuid,
    pub routing_operation_id: Uuid,
    pub status: WooStatus,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub operator_id: Option<Uuid>,
    #[sea_orm(column_type = "Json", nullable)]
    #[schema(value_type = Option<Object>)]
    pub captured_data: Option<Json>,
    pub quantity_completed: i32,
    pub quantity_rejected: i32,
    pub notes: Option<String>,
    #[sea_orm(column_type = "Json")]
    #[schema(value_type = Vec<crate::entities::FileRecord>)]
    pub attachments: FileRecordList,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::routing_operation::Entity",
        from = "Column::RoutingOperationId",
        to = "super::routing_operation::Column::Id"
    )]
    RoutingOperation,
    #[sea_orm(has_many = "super::woo_pause_event::Entity")]
    PauseEvents,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::routing_operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoutingOperation.def()
    }
}

impl Related<super::woo_pause_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PauseEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
