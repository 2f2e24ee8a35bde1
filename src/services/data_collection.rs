use crate::{
    entities::{
        data_collection,
        data_collection_activity::{self, ActivityField, ActivityFields},
        routing_operation, routing_operation_activity, work_order_operation,
    },
    errors::ServiceError,
    services::routings::AssignedActivity,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInput {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Array of `{id, name, label, type, required?, options?, unit?}`
    #[schema(value_type = Option<Vec<ActivityField>>)]
    pub fields: Option<Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignInput {
    pub routing_operation_id: Option<Uuid>,
    pub data_collection_activity_id: Option<Uuid>,
    pub is_required: Option<bool>,
    pub sequence: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectInput {
    pub work_order_operation_id: Option<Uuid>,
    pub data_collection_activity_id: Option<Uuid>,
    #[schema(value_type = Object)]
    pub data: Option<Value>,
}

/// Data-collection state of one work order operation
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WooDataCollection {
    pub work_order_operation_id: Uuid,
    pub activities: Vec<AssignedActivity>,
    pub collections: Vec<data_collection::Model>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::ValidationError(format!("{field} is required")))
}

/// Parses and checks activity fields: an array whose entries all carry a
/// non-empty `id`, `name`, `label` and `type`, with unique ids.
pub fn parse_fields(raw: &Value) -> Result<Vec<ActivityField>, ServiceError> {
    let items = raw
        .as_array()
        .ok_or_else(|| ServiceError::ValidationError("fields must be an array".to_string()))?;

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        for key in ["id", "name", "label", "type"] {
            let present = item
                .get(key)
                .and_then(Value::as_str)
                .map_or(false, |s| !s.trim().is_empty());
            if !present {
                return Err(ServiceError::ValidationError(format!(
                    "fields[{index}] is missing required property '{key}'"
                )));
            }
        }
        let field: ActivityField = serde_json::from_value(item.clone()).map_err(|e| {
            ServiceError::ValidationError(format!("fields[{index}] is invalid: {e}"))
        })?;
        if !seen.insert(field.id.clone()) {
            return Err(ServiceError::ValidationError(format!(
                "Duplicate field id '{}'",
                field.id
            )));
        }
        fields.push(field);
    }
    Ok(fields)
}

/// Checks collected values against the activity definition
pub fn check_collected_data(fields: &[ActivityField], data: &Value) -> Result<(), ServiceError> {
    let object = data
        .as_object()
        .ok_or_else(|| ServiceError::ValidationError("data must be a JSON object".to_string()))?;

    let missing: Vec<&str> = fields
        .iter()
        .filter(|f| f.is_required())
        .filter(|f| object.get(&f.id).map_or(true, Value::is_null))
        .map(|f| f.id.as_str())
        .collect();

    if !missing.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "Missing required field(s): {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct DataCollectionService {
    db: Arc<DatabaseConnection>,
}

impl DataCollectionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_activities(
        &self,
        team_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<data_collection_activity::Model>, ServiceError> {
        let mut query = data_collection_activity::Entity::find()
            .filter(data_collection_activity::Column::TeamId.eq(team_id));
        if active_only {
            query = query.filter(data_collection_activity::Column::IsActive.eq(true));
        }
        query
            .order_by_asc(data_collection_activity::Column::Name)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to list data collection activities");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get_activity(
        &self,
        team_id: Uuid,
        id: Uuid,
    ) -> Result<data_collection_activity::Model, ServiceError> {
        data_collection_activity::Entity::find_by_id(id)
            .filter(data_collection_activity::Column::TeamId.eq(team_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Data collection activity"))
    }

    #[instrument(skip(self, input))]
    pub async fn create_activity(
        &self,
        team_id: Uuid,
        input: ActivityInput,
    ) -> Result<data_collection_activity::Model, ServiceError> {
        let name = required(
            input
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            "name",
        )?;
        let fields = parse_fields(&required(input.fields, "fields")?)?;

        let now = Utc::now();
        let created = data_collection_activity::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team_id),
            name: Set(name),
            description: Set(input.description),
            fields: Set(ActivityFields(fields)),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to create data collection activity");
            ServiceError::DatabaseError(e)
        })?;

        info!(activity_id = %created.id, fields = created.fields.0.len(), "activity created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_activity(
        &self,
        team_id: Uuid,
        id: Uuid,
        input: ActivityInput,
    ) -> Result<data_collection_activity::Model, ServiceError> {
        let existing = self.get_activity(team_id, id).await?;
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
        if let Some(fields) = input.fields {
            active.fields = Set(ActivityFields(parse_fields(&fields)?));
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

    /// Removes an activity. Activities with collected data are deactivated instead so
    /// history stays readable. Returns `true` when the row was deleted.
    #[instrument(skip(self))]
    pub async fn delete_activity(&self, team_id: Uuid, id: Uuid) -> Result<bool, ServiceError> {
        let existing = self.get_activity(team_id, id).await?;

        let collected = data_collection::Entity::find()
            .filter(data_collection::Column::ActivityId.eq(existing.id))
            .count(&*self.db)
            .await?;
        if collected > 0 {
            let mut active = existing.into_active_model();
            active.is_active = Set(false);
            active.updated_at = Set(Utc::now());
            active.update(&*self.db).await?;
            info!(activity_id = %id, "activity deactivated");
            return Ok(false);
        }

        let txn = self.db.begin().await?;
        routing_operation_activity::Entity::delete_many()
            .filter(routing_operation_activity::Column::ActivityId.eq(existing.id))
            .exec(&txn)
            .await?;
        data_collection_activity::Entity::delete_by_id(existing.id)
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(activity_id = %id, "activity deleted");
        Ok(true)
    }

    /// Links an activity to a routing operation. Re-assigning updates the existing
    /// link; the flag tells whether a new link was created.
    #[instrument(skip(self, input))]
    pub async fn assign(
        &self,
        team_id: Uuid,
        input: AssignInput,
    ) -> Result<(routing_operation_activity::Model, bool), ServiceError> {
        let operation_id = required(input.routing_operation_id, "routingOperationId")?;
        let activity_id = required(
            input.data_collection_activity_id,
            "dataCollectionActivityId",
        )?;

        routing_operation::Entity::find_by_id(operation_id)
            .filter(routing_operation::Column::TeamId.eq(team_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Routing operation"))?;
        self.get_activity(team_id, activity_id).await?;

        let existing = routing_operation_activity::Entity::find()
            .filter(routing_operation_activity::Column::RoutingOperationId.eq(operation_id))
            .filter(routing_operation_activity::Column::ActivityId.eq(activity_id))
            .one(&*self.db)
            .await?;

        if let Some(link) = existing {
            let mut active = link.into_active_model();
            if let Some(is_required) = input.is_required {
                active.is_required = Set(is_required);
            }
            if let Some(sequence) = input.sequence {
                active.sequence = Set(sequence);
            }
            let updated = active.update(&*self.db).await?;
            return Ok((updated, false));
        }

        let sequence = match input.sequence {
            Some(sequence) => sequence,
            None => {
                let count = routing_operation_activity::Entity::find()
                    .filter(
                        routing_operation_activity::Column::RoutingOperationId.eq(operation_id),
                    )
                    .count(&*self.db)
                    .await?;
                count as i32 + 1
            }
        };

        let created = routing_operation_activity::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team_id),
            routing_operation_id: Set(operation_id),
            activity_id: Set(activity_id),
            is_required: Set(input.is_required.unwrap_or(false)),
            sequence: Set(sequence),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(
            routing_operation_id = %operation_id,
            activity_id = %activity_id,
            "activity assigned"
        );
        Ok((created, true))
    }

    #[instrument(skip(self))]
    pub async fn unassign(
        &self,
        team_id: Uuid,
        routing_operation_id: Option<Uuid>,
        activity_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let operation_id = required(routing_operation_id, "routingOperationId")?;
        let activity_id = required(activity_id, "dataCollectionActivityId")?;

        let result = routing_operation_activity::Entity::delete_many()
            .filter(routing_operation_activity::Column::TeamId.eq(team_id))
            .filter(routing_operation_activity::Column::RoutingOperationId.eq(operation_id))
            .filter(routing_operation_activity::Column::ActivityId.eq(activity_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Assignment"));
        }
        Ok(())
    }

    async fn find_woo(
        &self,
        team_id: Uuid,
        id: Uuid,
    ) -> Result<work_order_operation::Model, ServiceError> {
        work_order_operation::Entity::find_by_id(id)
            .filter(work_order_operation::Column::TeamId.eq(team_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Work order operation"))
    }

    /// Records operator input for an activity assigned to the operation's routing step
    #[instrument(skip(self, input))]
    pub async fn collect(
        &self,
        team_id: Uuid,
        operator_id: Uuid,
        input: CollectInput,
    ) -> Result<data_collection::Model, ServiceError> {
        let woo_id = required(input.work_order_operation_id, "workOrderOperationId")?;
        let activity_id = required(
            input.data_collection_activity_id,
            "dataCollectionActivityId",
        )?;
        let data = required(input.data, "data")?;

        let woo = self.find_woo(team_id, woo_id).await?;
        let activity = self.get_activity(team_id, activity_id).await?;

        let assigned = routing_operation_activity::Entity::find()
            .filter(
                routing_operation_activity::Column::RoutingOperationId
                    .eq(woo.routing_operation_id),
            )
            .filter(routing_operation_activity::Column::ActivityId.eq(activity.id))
            .one(&*self.db)
            .await?;
        if assigned.is_none() {
            return Err(ServiceError::ValidationError(
                "Activity is not assigned to this operation".to_string(),
            ));
        }

        check_collected_data(&activity.fields.0, &data)?;

        let created = data_collection::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team_id),
            work_order_operation_id: Set(woo.id),
            activity_id: Set(activity.id),
            operator_id: Set(operator_id),
            data: Set(data),
            collected_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to store collected data");
            ServiceError::DatabaseError(e)
        })?;

        info!(woo_id = %woo.id, activity_id = %activity.id, "data collected");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_collections(
        &self,
        team_id: Uuid,
        woo_id: Option<Uuid>,
    ) -> Result<Vec<data_collection::Model>, ServiceError> {
        let woo_id = required(woo_id, "workOrderOperationId")?;
        let woo = self.find_woo(team_id, woo_id).await?;

        Ok(data_collection::Entity::find()
            .filter(data_collection::Column::WorkOrderOperationId.eq(woo.id))
            .order_by_asc(data_collection::Column::CollectedAt)
            .all(&*self.db)
            .await?)
    }

    /// Activities assigned to the operation's routing step plus everything collected so far
    #[instrument(skip(self))]
    pub async fn for_work_order_operation(
        &self,
        team_id: Uuid,
        woo_id: Uuid,
    ) -> Result<WooDataCollection, ServiceError> {
        let woo = self.find_woo(team_id, woo_id).await?;

        let activities = routing_operation_activity::Entity::find()
            .filter(
                routing_operation_activity::Column::RoutingOperationId
                    .eq(woo.routing_operation_id),
            )
            .order_by_asc(routing_operation_activity::Column::Sequence)
            .find_also_related(data_collection_activity::Entity)
            .all(&*self.db)
            .await?
            .into_iter()
            .filter_map(|(link, activity)| {
                activity.map(|activity| AssignedActivity {
                    activity,
                    is_required: link.is_required,
                    sequence: link.sequence,
                })
            })
            .collect();

        let collections = data_collection::Entity::find()
            .filter(data_collection::Column::WorkOrderOperationId.eq(woo.id))
            .order_by_asc(data_collection::Column::CollectedAt)
            .all(&*self.db)
            .await?;

        Ok(WooDataCollection {
            work_order_operation_id: woo.id,
            activities,
            collections,
        })
    }
}
