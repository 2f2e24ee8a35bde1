use crate::{
    entities::{
        pause_reason::{self, PauseCategory},
        woo_pause_event,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    Iterable, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Raw pause-reason payload; `category` is checked against the six known values
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PauseReasonInput {
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

fn parse_category(raw: &str) -> Result<PauseCategory, ServiceError> {
    PauseCategory::from_str(raw.trim()).map_err(|_| {
        let allowed: Vec<String> = PauseCategory::iter().map(|c| c.to_string()).collect();
        ServiceError::ValidationError(format!(
            "Invalid category '{}'. Must be one of: {}",
            raw,
            allowed.join(", ")
        ))
    })
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PauseCategoryInfo {
    pub value: PauseCategory,
    pub label: String,
}

/// Pause totals for one reason within a window
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PauseReasonUsage {
    pub pause_reason_id: Uuid,
    pub name: String,
    pub category: PauseCategory,
    pub pause_count: u64,
    pub total_paused_seconds: i64,
}

/// What DELETE did to the reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    Deactivated,
}

#[derive(Clone)]
pub struct PauseReasonService {
    db: Arc<DatabaseConnection>,
}

impl PauseReasonService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All six categories with display labels
    pub fn categories() -> Vec<PauseCategoryInfo> {
        PauseCategory::iter()
            .map(|value| {
                let raw = value.to_string();
                let mut label = raw.clone();
                if let Some(first) = label.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                PauseCategoryInfo { value, label }
            })
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        team_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<pause_reason::Model>, ServiceError> {
        let mut query =
            pause_reason::Entity::find().filter(pause_reason::Column::TeamId.eq(team_id));
        if !include_inactive {
            query = query.filter(pause_reason::Column::IsActive.eq(true));
        }
        query
            .order_by_asc(pause_reason::Column::Category)
            .order_by_asc(pause_reason::Column::Name)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to list pause reasons");
                ServiceError::DatabaseError(e)
            })
    }

    async fn find(&self, team_id: Uuid, id: Uuid) -> Result<pause_reason::Model, ServiceError> {
        pause_reason::Entity::find_by_id(id)
            .filter(pause_reason::Column::TeamId.eq(team_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Pause reason"))
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        team_id: Uuid,
        input: PauseReasonInput,
    ) -> Result<pause_reason::Model, ServiceError> {
        input.validate()?;
        let name = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("name is required".to_string()))?;
        let category = input
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ServiceError::ValidationError("category is required".to_string()))
            .and_then(parse_category)?;

        let now = Utc::now();
        let created = pause_reason::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team_id),
            name: Set(name),
            description: Set(input.description),
            category: Set(category),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to create pause reason");
            ServiceError::DatabaseError(e)
        })?;

        info!(pause_reason_id = %created.id, category = %category, "pause reason created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        team_id: Uuid,
        id: Uuid,
        input: PauseReasonInput,
    ) -> Result<pause_reason::Model, ServiceError> {
        input.validate()?;
        let existing = self.find(team_id, id).await?;

        let mut active = existing.into_active_model();
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "name must not be empty".to_string(),
                ));
            }
            active.name = Set(name);
        }
        if let Some(category) = input.category.as_deref() {
            active.category = Set(parse_category(category)?);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    /// Hard-deletes an unused reason; a reason referenced by pause history is deactivated instead
    #[instrument(skip(self))]
    pub async fn delete(&self, team_id: Uuid, id: Uuid) -> Result<DeleteOutcome, ServiceError> {
        let existing = self.find(team_id, id).await?;

        let references = woo_pause_event::Entity::find()
            .filter(woo_pause_event::Column::PauseReasonId.eq(existing.id))
            .count(&*self.db)
            .await?;

        if references > 0 {
            let mut active = existing.into_active_model();
            active.is_active = Set(false);
            active.updated_at = Set(Utc::now());
            active.update(&*self.db).await?;
            info!(pause_reason_id = %id, references, "pause reason deactivated");
            return Ok(DeleteOutcome::Deactivated);
        }

        pause_reason::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        info!(pause_reason_id = %id, "pause reason deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Per-reason pause counts and durations for pauses starting inside `[start, end)`.
    /// Pauses that are still open are counted up to now.
    #[instrument(skip(self))]
    pub async fn usage(
        &self,
        team_id: Uuid,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<PauseReasonUsage>, ServiceError> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(ServiceError::ValidationError(
                    "endDate must not precede startDate".to_string(),
                ));
            }
        }

        let mut window = Condition::all().add(woo_pause_event::Column::TeamId.eq(team_id));
        if let Some(start) = start {
            window = window.add(woo_pause_event::Column::PausedAt.gte(start));
        }
        if let Some(end) = end {
            window = window.add(woo_pause_event::Column::PausedAt.lt(end));
        }

        let events = woo_pause_event::Entity::find()
            .filter(window)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to load pause events");
                ServiceError::DatabaseError(e)
            })?;

        let now = Utc::now();
        let mut totals: HashMap<Uuid, (u64, i64)> = HashMap::new();
        for event in &events {
            let resumed = event.resumed_at.unwrap_or(now);
            let seconds = (resumed - event.paused_at).num_seconds().max(0);
            let entry = totals.entry(event.pause_reason_id).or_default();
            entry.0 += 1;
            entry.1 += seconds;
        }

        let reasons = self.list(team_id, true).await?;
        let mut usage: Vec<PauseReasonUsage> = reasons
            .into_iter()
            .map(|reason| {
                let (pause_count, total_paused_seconds) =
                    totals.get(&reason.id).copied().unwrap_or_default();
                PauseReasonUsage {
                    pause_reason_id: reason.id,
                    name: reason.name,
                    category: reason.category,
                    pause_count,
                    total_paused_seconds,
                }
            })
            .collect();
        usage.sort_by(|a, b| {
            b.total_paused_seconds
                .cmp(&a.total_paused_seconds)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_all_six_categories() {
        for raw in ["planned", "unplanned", "maintenance", "quality", "material", "other"] {
            assert!(parse_category(raw).is_ok(), "{raw} should parse");
        }
    }

    #[test]
    fn unknown_category_lists_allowed_values() {
        let err = parse_category("coffee").unwrap_err();
        assert_matches!(&err, ServiceError::ValidationError(msg) if msg.contains("maintenance"));
    }

    #[test]
    fn categories_have_capitalized_labels() {
        let categories = PauseReasonService::categories();
        assert_eq!(categories.len(), 6);
        assert_eq!(categories[0].label, "Planned");
    }
}
