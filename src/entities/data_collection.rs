use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Values an operator captured for one activity on one work order operation
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "data_collections")]
#[serde(rename_all = "camelCase")]
#[schema(as = DataCollection)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub team_id: Uuid,
    pub work_order_operation_id: Uuid,
    pub activity_id: Uuid,
    pub operator_id: Uuid,
    #[sea_orm(column_type = "Json")]
    #[schema(value_type = Object)]
    pub data: Json,
    pub collected_at: DateTime<Utc>,
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
        belongs_to = "super::data_collection_activity::Entity",
        from = "Column::ActivityId",
        to = "super::data_collection_activity::Column::Id"
    )]
    Activity,
}

impl Related<super::work_order_operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrderOperation.def()
    }
}

impl Related<super::data_collection_activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
