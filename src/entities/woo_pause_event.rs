use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One pause of a work order operation; `resumed_at` stays null while paused
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "woo_pause_events")]
#[serde(rename_all = "camelCase")]
#[schema(as = WooPauseEvent)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub team_id: Uuid,
    pub work_order_operation_id: Uuid,
    pub pause_reason_id: Uuid,
    pub notes: Option<String>,
    pub paused_by: Uuid,
    pub paused_at: DateTime<Utc>,
    pub resumed_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::work_order_operation::Entity",
        from = "Column::WorkOrderOperationId",
        to = "super::work_order_operation::Column::Id"
    )]
    WorkOrderOperation,
    #[sea_orm(
        belongs_to = "super::pause_reason::Entity",
        from = "Column::PauseReasonId",
        to = "super::pause_reason::Column::Id"
    )]
    PauseReason,
}

impl Related<super::work_order_operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrderOperation.def()
    }
}

impl Related<super::pause_reason::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PauseReason.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
