use super::file_record::FileRecordList;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "routing_operations")]
#[serde(rename_all = "camelCase")]
#[schema(as = RoutingOperation)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub team_id: Uuid,
    pub routing_id: Uuid,
    pub sequence: i32,
    pub title: String,
    pub department: Option<String>,
    pub setup_time_seconds: i32,
    pub run_time_seconds: i32,
    pub instructions: Option<String>,
    #[sea_orm(column_type = "Json")]
    #[schema(value_type = Vec<crate::entities::FileRecord>)]
    pub attachments: FileRecordList,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::routing::Entity",
        from = "Column::RoutingId",
        to = "super::routing::Column::Id"
    )]
    Routing,
    #[sea_orm(has_many = "super::routing_operation_activity::Entity")]
    Activities,
}

impl Related<super::routing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Routing.def()
    }
}

impl Related<super::routing_operation_activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
