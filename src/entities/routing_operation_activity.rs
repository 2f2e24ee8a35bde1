use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Link between a routing operation and a data-collection activity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "routing_operation_activities")]
#[serde(rename_all = "camelCase")]
#[schema(as = RoutingOperationActivity)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub team_id: Uuid,
    pub routing_operation_id: Uuid,
    pub activity_id: Uuid,
    pub is_required: bool,
    pub sequence: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::routing_operation::Entity",
        from = "Column::RoutingOperationId",
        to = "super::routing_operation::Column::Id"
    )]
    RoutingOperation,
    #[sea_orm(
        belongs_to = "super::data_collection_activity::Entity",
        from = "Column::ActivityId",
        to = "super::data_collection_activity::Column::Id"
    )]
    Activity,
}

impl Related<super::routing_operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoutingOperation.def()
    }
}

impl Related<super::data_collection_activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
