//! Work order operation lifecycle.
//!
//! ```text
//! pending --start--> in_progress --pause--> paused
//!                    in_progress <--resume-- paused
//!                    in_progress --complete--> completed
//! ```
//!
//! Every transition is written with `WHERE id = ? AND status = <expected>` so two
//! concurrent requests against the same operation cannot both succeed. The current
//! row is read before the transaction opens and the conditional update is the
//! transaction's first statement, so a writer never has to upgrade a read lock.

use crate::{
    entities::{
        file_record::{FileRecord, FileRecordList},
        order::{self, OrderStatus},
        pause_reason, routing_operation, woo_pause_event,
        work_order_operation::{self, WooStatus},
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Actions an operator can take on a work order operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum WooAction {
    Start,
    Pause,
    Resume,
    Complete,
}

impl WooAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Complete => "complete",
        }
    }
}

/// The transition table. Anything not listed is rejected.
pub fn next_status(from: WooStatus, action: WooAction) -> Result<WooStatus, ServiceError> {
    use WooAction::*;
    use WooStatus::*;

    match (from, action) {
        (Pending, Start) => Ok(InProgress),
        (InProgress, Pause) => Ok(Paused),
        (Paused, Resume) => Ok(InProgress),
        (InProgress, Complete) => Ok(Completed),
        (from, action) => Err(ServiceError::InvalidTransition {
            entity: "work order operation",
            action: action.verb(),
            from: from.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PauseInput {
    pub pause_reason_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteInput {
    #[schema(value_type = Option<Object>)]
    pub captured_data: Option<Value>,
    #[validate(range(min = 0))]
    pub quantity_completed: Option<i32>,
    #[validate(range(min = 0))]
    pub quantity_rejected: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWooInput {
    pub notes: Option<String>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct WooFilter {
    pub order_id: Option<Uuid>,
    pub status: Option<WooStatus>,
}

#[derive(Clone)]
pub struct WorkOrderOperationService {
    db: Arc<DatabaseConnection>,
}

impl WorkOrderOperationService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        team_id: Uuid,
        filter: WooFilter,
    ) -> Result<Vec<work_order_operation::Model>, ServiceError> {
        let mut query = work_order_operation::Entity::find()
            .filter(work_order_operation::Column::TeamId.eq(team_id));
        if let Some(order_id) = filter.order_id {
            query = query.filter(work_order_operation::Column::OrderId.eq(order_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(work_order_operation::Column::Status.eq(status));
        }

        query
            .join(
                JoinType::InnerJoin,
                work_order_operation::Relation::RoutingOperation.def(),
            )
            .order_by_asc(work_order_operation::Column::CreatedAt)
            .order_by_asc(work_order_operation::Column::OrderId)
            .order_by_asc(routing_operation::Column::Sequence)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to list work order operations");
                ServiceError::DatabaseError(e)
            })
    }

    async fn find<C: ConnectionTrait>(
        conn: &C,
        team_id: Uuid,
        id: Uuid,
    ) -> Result<work_order_operation::Model, ServiceError> {
        work_order_operation::Entity::find_by_id(id)
            .filter(work_order_operation::Column::TeamId.eq(team_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Work order operation"))
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        team_id: Uuid,
        id: Uuid,
    ) -> Result<work_order_operation::Model, ServiceError> {
        Self::find(&*self.db, team_id, id).await
    }

    /// Edits notes and schedule; status is only changed through the lifecycle actions
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        team_id: Uuid,
        id: Uuid,
        input: UpdateWooInput,
    ) -> Result<work_order_operation::Model, ServiceError> {
        let woo = Self::find(&*self.db, team_id, id).await?;

        let start = input.scheduled_start.or(woo.scheduled_start);
        let end = input.scheduled_end.or(woo.scheduled_end);
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(ServiceError::ValidationError(
                    "scheduledEnd must not precede scheduledStart".to_string(),
                ));
            }
        }

        let mut active = woo.into_active_model();
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }
        if input.scheduled_start.is_some() {
            active.scheduled_start = Set(input.scheduled_start);
        }
        if input.scheduled_end.is_some() {
            active.scheduled_end = Set(input.scheduled_end);
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db).await?)
    }

    /// Writes the new status only if the row still holds the status `woo` was read with.
    async fn apply_transition<C: ConnectionTrait>(
        conn: &C,
        woo: &work_order_operation::Model,
        action: WooAction,
        update: work_order_operation::ActiveModel,
    ) -> Result<(), ServiceError> {
        let result = work_order_operation::Entity::update_many()
            .set(update)
            .filter(work_order_operation::Column::Id.eq(woo.id))
            .filter(work_order_operation::Column::Status.eq(woo.status))
            .exec(conn)
            .await
            .map_err(|e| {
                error!(error = %e, woo_id = %woo.id, "failed to persist transition");
                ServiceError::DatabaseError(e)
            })?;

        if result.rows_affected == 0 {
            warn!(woo_id = %woo.id, action = %action, "concurrent transition lost the race");
            return Err(ServiceError::InvalidTransition {
                entity: "work order operation",
                action: action.verb(),
                from: woo.status.to_string(),
            });
        }

        counter!("mes.woo.transitions", 1, "action" => action.verb());
        Ok(())
    }

    #[instrument(skip(self), fields(woo_id = %id))]
    pub async fn start(
        &self,
        team_id: Uuid,
        id: Uuid,
        operator_id: Uuid,
    ) -> Result<work_order_operation::Model, ServiceError> {
        let woo = Self::find(&*self.db, team_id, id).await?;
        let to = next_status(woo.status, WooAction::Start)?;
        let now = Utc::now();

        let update = work_order_operation::ActiveModel {
            status: Set(to),
            operator_id: Set(Some(operator_id)),
            actual_start: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };
        let txn = self.db.begin().await?;
        Self::apply_transition(&txn, &woo, WooAction::Start, update).await?;

        // The first started operation moves its order into production
        order::Entity::update_many()
            .set(order::ActiveModel {
                status: Set(OrderStatus::InProgress),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(order::Column::Id.eq(woo.order_id))
            .filter(order::Column::Status.is_in([OrderStatus::Planned, OrderStatus::Released]))
            .exec(&txn)
            .await?;

        let updated = Self::find(&txn, team_id, id).await?;
        txn.commit().await?;

        info!(woo_id = %id, operator_id = %operator_id, "operation started");
        Ok(updated)
    }

    #[instrument(skip(self, input), fields(woo_id = %id))]
    pub async fn pause(
        &self,
        team_id: Uuid,
        id: Uuid,
        paused_by: Uuid,
        input: PauseInput,
    ) -> Result<work_order_operation::Model, ServiceError> {
        let reason_raw = input
            .pause_reason_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("pauseReasonId is required".to_string()))?;
        let reason_id = Uuid::parse_str(reason_raw).map_err(|_| {
            ServiceError::ValidationError("pauseReasonId must be a valid UUID".to_string())
        })?;

        let woo = Self::find(&*self.db, team_id, id).await?;

        pause_reason::Entity::find_by_id(reason_id)
            .filter(pause_reason::Column::TeamId.eq(team_id))
            .filter(pause_reason::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Pause reason"))?;

        let to = next_status(woo.status, WooAction::Pause)?;
        let now = Utc::now();
        let update = work_order_operation::ActiveModel {
            status: Set(to),
            updated_at: Set(now),
            ..Default::default()
        };
        let txn = self.db.begin().await?;
        Self::apply_transition(&txn, &woo, WooAction::Pause, update).await?;

        woo_pause_event::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team_id),
            work_order_operation_id: Set(woo.id),
            pause_reason_id: Set(reason_id),
            notes: Set(input.notes),
            paused_by: Set(paused_by),
            paused_at: Set(now),
            resumed_at: Set(None),
        }
        .insert(&txn)
        .await?;

        let updated = Self::find(&txn, team_id, id).await?;
        txn.commit().await?;

        info!(woo_id = %id, pause_reason_id = %reason_id, "operation paused");
        Ok(updated)
    }

    #[instrument(skip(self), fields(woo_id = %id))]
    pub async fn resume(
        &self,
        team_id: Uuid,
        id: Uuid,
    ) -> Result<work_order_operation::Model, ServiceError> {
        let woo = Self::find(&*self.db, team_id, id).await?;
        let to = next_status(woo.status, WooAction::Resume)?;
        let now = Utc::now();

        let update = work_order_operation::ActiveModel {
            status: Set(to),
            updated_at: Set(now),
            ..Default::default()
        };
        let txn = self.db.begin().await?;
        Self::apply_transition(&txn, &woo, WooAction::Resume, update).await?;

        let closed = woo_pause_event::Entity::update_many()
            .set(woo_pause_event::ActiveModel {
                resumed_at: Set(Some(now)),
                ..Default::default()
            })
            .filter(woo_pause_event::Column::WorkOrderOperationId.eq(woo.id))
            .filter(woo_pause_event::Column::ResumedAt.is_null())
            .exec(&txn)
            .await?;
        if closed.rows_affected == 0 {
            warn!(woo_id = %id, "resumed operation had no open pause event");
        }

        let updated = Self::find(&txn, team_id, id).await?;
        txn.commit().await?;

        info!(woo_id = %id, "operation resumed");
        Ok(updated)
    }

    #[instrument(skip(self, input), fields(woo_id = %id))]
    pub async fn complete(
        &self,
        team_id: Uuid,
        id: Uuid,
        input: CompleteInput,
    ) -> Result<work_order_operation::Model, ServiceError> {
        input.validate()?;
        if let Some(data) = &input.captured_data {
            if !data.is_object() {
                return Err(ServiceError::ValidationError(
                    "capturedData must be a JSON object".to_string(),
                ));
            }
        }

        let woo = Self::find(&*self.db, team_id, id).await?;
        let to = next_status(woo.status, WooAction::Complete)?;
        let now = Utc::now();

        let mut update = work_order_operation::ActiveModel {
            status: Set(to),
            actual_end: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };
        if let Some(data) = input.captured_data {
            update.captured_data = Set(Some(data));
        }
        if let Some(completed) = input.quantity_completed {
            update.quantity_completed = Set(completed);
        }
        if let Some(rejected) = input.quantity_rejected {
            update.quantity_rejected = Set(rejected);
        }
        if let Some(notes) = input.notes {
            update.notes = Set(Some(notes));
        }
        Self::apply_transition(&*self.db, &woo, WooAction::Complete, update).await?;

        info!(woo_id = %id, "operation completed");
        Self::find(&*self.db, team_id, id).await
    }

    #[instrument(skip(self))]
    pub async fn list_attachments(
        &self,
        team_id: Uuid,
        id: Uuid,
    ) -> Result<Vec<FileRecord>, ServiceError> {
        Ok(Self::find(&*self.db, team_id, id)
            .await?
            .attachments
            .into_inner())
    }

    #[instrument(skip(self, record), fields(file_id = %record.id))]
    pub async fn add_attachment(
        &self,
        team_id: Uuid,
        id: Uuid,
        record: FileRecord,
    ) -> Result<Vec<FileRecord>, ServiceError> {
        let woo = Self::find(&*self.db, team_id, id).await?;
        let attachments = woo.attachments.with_added(record);
        self.store_attachments(woo, attachments).await
    }

    #[instrument(skip(self))]
    pub async fn remove_attachment(
        &self,
        team_id: Uuid,
        id: Uuid,
        file_id: &str,
    ) -> Result<Vec<FileRecord>, ServiceError> {
        let woo = Self::find(&*self.db, team_id, id).await?;
        let attachments = woo.attachments.without(file_id);
        self.store_attachments(woo, attachments).await
    }

    async fn store_attachments(
        &self,
        woo: work_order_operation::Model,
        attachments: FileRecordList,
    ) -> Result<Vec<FileRecord>, ServiceError> {
        let mut active = woo.into_active_model();
        active.attachments = Set(attachments);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await.map_err(|e| {
            error!(error = %e, "failed to store work order operation attachments");
            ServiceError::DatabaseError(e)
        })?;
        Ok(updated.attachments.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case(WooStatus::Pending, WooAction::Start, WooStatus::InProgress)]
    #[case(WooStatus::InProgress, WooAction::Pause, WooStatus::Paused)]
    #[case(WooStatus::Paused, WooAction::Resume, WooStatus::InProgress)]
    #[case(WooStatus::InProgress, WooAction::Complete, WooStatus::Completed)]
    fn allowed_transitions(
        #[case] from: WooStatus,
        #[case] action: WooAction,
        #[case] to: WooStatus,
    ) {
        assert_eq!(next_status(from, action).unwrap(), to);
    }

    #[rstest]
    #[case(WooStatus::Pending, WooAction::Pause)]
    #[case(WooStatus::Pending, WooAction::Resume)]
    #[case(WooStatus::Pending, WooAction::Complete)]
    #[case(WooStatus::InProgress, WooAction::Start)]
    #[case(WooStatus::InProgress, WooAction::Resume)]
    #[case(WooStatus::Paused, WooAction::Start)]
    #[case(WooStatus::Paused, WooAction::Pause)]
    #[case(WooStatus::Paused, WooAction::Complete)]
    #[case(WooStatus::Completed, WooAction::Start)]
    #[case(WooStatus::Completed, WooAction::Pause)]
    #[case(WooStatus::Completed, WooAction::Resume)]
    #[case(WooStatus::Completed, WooAction::Complete)]
    fn rejected_transitions(#[case] from: WooStatus, #[case] action: WooAction) {
        assert_matches!(
            next_status(from, action),
            Err(ServiceError::InvalidTransition { .. })
        );
    }

    #[test]
    fn rejection_message_names_action_and_state() {
        let err = next_status(WooStatus::Paused, WooAction::Complete).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot complete work order operation in status 'paused'"
        );
    }

    #[test]
    fn negative_quantities_fail_validation() {
        let input = CompleteInput {
            quantity_completed: Some(-1),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }
}
