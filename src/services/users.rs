use crate::{
    entities::{
        team, team_member,
        team_member::MemberRole,
        user,
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// A user as seen from inside one team
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberView {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: MemberRole,
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Returns the caller's membership row for `team_id`, if any
    #[instrument(skip(self))]
    pub async fn membership(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<team_member::Model>, ServiceError> {
        team_member::Entity::find()
            .filter(team_member::Column::TeamId.eq(team_id))
            .filter(team_member::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to load team membership");
                ServiceError::DatabaseError(e)
            })
    }

    /// Members of the team ordered by email
    #[instrument(skip(self))]
    pub async fn list_team_members(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<TeamMemberView>, ServiceError> {
        let rows = team_member::Entity::find()
            .filter(team_member::Column::TeamId.eq(team_id))
            .find_also_related(user::Entity)
            .order_by_asc(user::Column::Email)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to list team members");
                ServiceError::DatabaseError(e)
            })?;

        Ok(rows
            .into_iter()
            .filter_map(|(member, user)| {
                user.map(|u| TeamMemberView {
                    id: u.id,
                    email: u.email,
                    name: u.name,
                    role: member.role,
                })
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn create_team(&self, name: &str) -> Result<team::Model, ServiceError> {
        let model = team::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
        };
        Ok(model.insert(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn create_user(
        &self,
        email: &str,
        name: Option<String>,
    ) -> Result<user::Model, ServiceError> {
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "User with email {email} already exists"
            )));
        }

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            name: Set(name),
            created_at: Set(Utc::now()),
        };
        Ok(model.insert(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn add_member(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<team_member::Model, ServiceError> {
        let model = team_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team_id),
            user_id: Set(user_id),
            role: Set(role),
            created_at: Set(Utc::now()),
        };
        Ok(model.insert(&*self.db).await?)
    }
}
