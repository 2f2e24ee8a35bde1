use crate::{
    auth::{generate_api_key, hash_api_key},
    entities::api_key,
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Returned once, at creation; the plaintext key is never retrievable again
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApiKey {
    #[serde(flatten)]
    pub key: api_key::Model,
    pub api_key: String,
}

#[derive(Clone)]
pub struct ApiKeyService {
    db: Arc<DatabaseConnection>,
    prefix: String,
}

impl ApiKeyService {
    pub fn new(db: Arc<DatabaseConnection>, prefix: String) -> Self {
        Self { db, prefix }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, team_id: Uuid) -> Result<Vec<api_key::Model>, ServiceError> {
        api_key::Entity::find()
            .filter(api_key::Column::TeamId.eq(team_id))
            .order_by_desc(api_key::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to list api keys");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, team_id: Uuid, id: Uuid) -> Result<api_key::Model, ServiceError> {
        api_key::Entity::find_by_id(id)
            .filter(api_key::Column::TeamId.eq(team_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("API key"))
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        team_id: Uuid,
        created_by: Uuid,
        input: CreateApiKeyInput,
    ) -> Result<CreatedApiKey, ServiceError> {
        input.validate()?;
        if let Some(expires_at) = input.expires_at {
            if expires_at <= Utc::now() {
                return Err(ServiceError::ValidationError(
                    "expiresAt must be in the future".to_string(),
                ));
            }
        }

        let generated = generate_api_key(&self.prefix);
        let key = api_key::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team_id),
            name: Set(input.name.trim().to_string()),
            key_prefix: Set(generated.display_prefix),
            key_hash: Set(generated.hash),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
            expires_at: Set(input.expires_at),
            last_used_at: Set(None),
            revoked_at: Set(None),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to store api key");
            ServiceError::DatabaseError(e)
        })?;

        info!(api_key_id = %key.id, team_id = %team_id, "api key created");
        Ok(CreatedApiKey {
            key,
            api_key: generated.plaintext,
        })
    }

    /// Revokes the key. Revoking twice keeps the first revocation time.
    #[instrument(skip(self))]
    pub async fn revoke(&self, team_id: Uuid, id: Uuid) -> Result<api_key::Model, ServiceError> {
        let key = self.get(team_id, id).await?;
        if key.revoked_at.is_some() {
            return Ok(key);
        }

        let mut active = key.into_active_model();
        active.revoked_at = Set(Some(Utc::now()));
        let revoked = active.update(&*self.db).await?;
        info!(api_key_id = %id, "api key revoked");
        Ok(revoked)
    }

    /// Resolves a presented key to its record; unknown, revoked and expired keys yield `None`.
    #[instrument(skip(self, plaintext))]
    pub async fn authenticate(
        &self,
        plaintext: &str,
    ) -> Result<Option<api_key::Model>, ServiceError> {
        if plaintext.is_empty() {
            return Ok(None);
        }

        let Some(key) = api_key::Entity::find()
            .filter(api_key::Column::KeyHash.eq(hash_api_key(plaintext)))
            .one(&*self.db)
            .await?
        else {
            debug!("unknown api key presented");
            return Ok(None);
        };

        let now = Utc::now();
        if !key.is_usable_at(now) {
            warn!(api_key_id = %key.id, "revoked or expired api key presented");
            return Ok(None);
        }

        let mut active = key.into_active_model();
        active.last_used_at = Set(Some(now));
        Ok(Some(active.update(&*self.db).await?))
    }
}
