use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Pause-reason taxonomy; the only six accepted categories
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
pub enum PauseCategory {
    #[sea_orm(string_value = "planned")]
    Planned,
    #[sea_orm(string_value = "unplanned")]
    Unplanned,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "quality")]
    Quality,
    #[sea_orm(string_value = "material")]
    Material,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "pause_reasons")]
#[serde(rename_all = "camelCase")]
#[schema(as = PauseReason)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: PauseCategory,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::woo_pause_event::Entity")]
    PauseEvents,
}

impl Related<super::woo_pause_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PauseEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
