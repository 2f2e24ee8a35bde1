use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "api_keys")]
#[serde(rename_all = "camelCase")]
#[schema(as = ApiKey)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    /// Leading characters of the secret, safe to display
    pub key_prefix: String,
    /// SHA-256 hex digest of the full secret
    #[sea_orm(unique)]
    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub key_hash: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Model {
    /// A key is usable when it is neither revoked nor past its expiry.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at.map_or(true, |exp| exp > now)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key() -> Model {
        Model {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            name: "line-3 dashboard".into(),
            key_prefix: "mes_ab12".into(),
            key_hash: "00".repeat(32),
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            expires_at: None,
            last_used_at: None,
            revoked_at: None,
        }
    }

    #[test]
    fn revoked_or_expired_keys_are_unusable() {
        let now = Utc::now();
        assert!(key().is_usable_at(now));

        let mut revoked = key();
        revoked.revoked_at = Some(now);
        assert!(!revoked.is_usable_at(now));

        let mut expired = key();
        expired.expires_at = Some(now - Duration::minutes(1));
        assert!(!expired.is_usable_at(now));
    }

    #[test]
    fn hash_is_never_serialized() {
        let json = serde_json::to_value(key()).unwrap();
        assert!(json.get("keyHash").is_none());
        assert_eq!(json["keyPrefix"], "mes_ab12");
    }
}
