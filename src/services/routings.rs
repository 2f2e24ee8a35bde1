use crate::{
    entities::{
        data_collection_activity,
        file_record::{FileRecord, FileRecordList},
        routing, routing_operation, routing_operation_activity, work_order_operation,
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationInput {
    /// Defaults to one past the highest existing sequence
    pub sequence: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub department: Option<String>,
    #[validate(range(min = 0))]
    pub setup_time_seconds: Option<i32>,
    #[validate(range(min = 0))]
    pub run_time_seconds: Option<i32>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOperationInput {
    pub sequence: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub department: Option<String>,
    #[validate(range(min = 0))]
    pub setup_time_seconds: Option<i32>,
    #[validate(range(min = 0))]
    pub run_time_seconds: Option<i32>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoutingInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    #[validate]
    pub operations: Vec<OperationInput>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoutingInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Client-supplied metadata for a new attachment
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInput {
    /// Defaults to a fresh UUID
    pub id: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub url: String,
    #[validate(range(min = 0))]
    pub size: Option<i64>,
    pub mime_type: Option<String>,
}

impl AttachmentInput {
    pub fn into_record(self, uploaded_by: Option<Uuid>) -> FileRecord {
        FileRecord {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: self.name,
            url: self.url,
            size: self.size,
            mime_type: self.mime_type,
            uploaded_at: Utc::now(),
            uploaded_by,
        }
    }
}

/// A data-collection activity as assigned to an operation
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedActivity {
    pub activity: data_collection_activity::Model,
    pub is_required: bool,
    pub sequence: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationDetail {
    #[serde(flatten)]
    pub operation: routing_operation::Model,
    pub activities: Vec<AssignedActivity>,
}

/// Routing with its ordered operations
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDetail {
    #[serde(flatten)]
    pub routing: routing::Model,
    pub operations: Vec<OperationDetail>,
}

#[derive(Clone)]
pub struct RoutingService {
    db: Arc<DatabaseConnection>,
}

impl RoutingService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, team_id: Uuid) -> Result<Vec<routing::Model>, ServiceError> {
        routing::Entity::find()
            .filter(routing::Column::TeamId.eq(team_id))
            .order_by_asc(routing::Column::Name)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to list routings");
                ServiceError::DatabaseError(e)
            })
    }

    async fn find_routing<C: ConnectionTrait>(
        conn: &C,
        team_id: Uuid,
        id: Uuid,
    ) -> Result<routing::Model, ServiceError> {
        routing::Entity::find_by_id(id)
            .filter(routing::Column::TeamId.eq(team_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Routing"))
    }

    async fn find_operation<C: ConnectionTrait>(
        conn: &C,
        team_id: Uuid,
        routing_id: Uuid,
        operation_id: Uuid,
    ) -> Result<routing_operation::Model, ServiceError> {
        routing_operation::Entity::find_by_id(operation_id)
            .filter(routing_operation::Column::TeamId.eq(team_id))
            .filter(routing_operation::Column::RoutingId.eq(routing_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Routing operation"))
    }

    async fn bump_version<C: ConnectionTrait>(
        conn: &C,
        routing: routing::Model,
    ) -> Result<routing::Model, ServiceError> {
        let next = routing.version + 1;
        let mut active = routing.into_active_model();
        active.version = Set(next);
        active.updated_at = Set(Utc::now());
        Ok(active.update(conn).await?)
    }

    /// Routing with operations ordered by sequence, each with its assigned activities
    #[instrument(skip(self))]
    pub async fn get(&self, team_id: Uuid, id: Uuid) -> Result<RoutingDetail, ServiceError> {
        let routing = Self::find_routing(&*self.db, team_id, id).await?;

        let operations = routing_operation::Entity::find()
            .filter(routing_operation::Column::RoutingId.eq(routing.id))
            .order_by_asc(routing_operation::Column::Sequence)
            .all(&*self.db)
            .await?;
        let operation_ids: Vec<Uuid> = operations.iter().map(|op| op.id).collect();

        let assignments = routing_operation_activity::Entity::find()
            .filter(routing_operation_activity::Column::RoutingOperationId.is_in(operation_ids))
            .order_by_asc(routing_operation_activity::Column::Sequence)
            .find_also_related(data_collection_activity::Entity)
            .all(&*self.db)
            .await?;

        let mut by_operation: HashMap<Uuid, Vec<AssignedActivity>> = HashMap::new();
        for (link, activity) in assignments {
            if let Some(activity) = activity {
                by_operation
                    .entry(link.routing_operation_id)
                    .or_default()
                    .push(AssignedActivity {
                        activity,
                        is_required: link.is_required,
                        sequence: link.sequence,
                    });
            }
        }

        let operations = operations
            .into_iter()
            .map(|operation| OperationDetail {
                activities: by_operation.remove(&operation.id).unwrap_or_default(),
                operation,
            })
            .collect();

        Ok(RoutingDetail {
            routing,
            operations,
        })
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(
        &self,
        team_id: Uuid,
        input: CreateRoutingInput,
    ) -> Result<RoutingDetail, ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;
        let now = Utc::now();
        let routing = routing::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team_id),
            name: Set(input.name),
            description: Set(input.description),
            version: Set(1),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut operations = Vec::with_capacity(input.operations.len());
        for (index, op) in input.operations.into_iter().enumerate() {
            let sequence = op.sequence.unwrap_or((index as i32 + 1) * 10);
            let operation = Self::insert_operation(&txn, team_id, routing.id, sequence, op).await?;
            operations.push(OperationDetail {
                operation,
                activities: Vec::new(),
            });
        }
        txn.commit().await?;

        info!(routing_id = %routing.id, "routing created");
        Ok(RoutingDetail {
            routing,
            operations,
        })
    }

    async fn insert_operation<C: ConnectionTrait>(
        conn: &C,
        team_id: Uuid,
        routing_id: Uuid,
        sequence: i32,
        input: OperationInput,
    ) -> Result<routing_operation::Model, ServiceError> {
        let now = Utc::now();
        Ok(routing_operation::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team_id),
            routing_id: Set(routing_id),
            sequence: Set(sequence),
            title: Set(input.title),
            department: Set(input.department),
            setup_time_seconds: Set(input.setup_time_seconds.unwrap_or(0)),
            run_time_seconds: Set(input.run_time_seconds.unwrap_or(0)),
            instructions: Set(input.instructions),
            attachments: Set(FileRecordList::default()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await?)
    }

    /// Updates routing metadata and increments its version
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        team_id: Uuid,
        id: Uuid,
        input: UpdateRoutingInput,
    ) -> Result<routing::Model, ServiceError> {
        input.validate()?;
        let routing = Self::find_routing(&*self.db, team_id, id).await?;

        let next = routing.version + 1;
        let mut active = routing.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.version = Set(next);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await.map_err(|e| {
            error!(error = %e, routing_id = %id, "failed to update routing");
            ServiceError::DatabaseError(e)
        })?;
        info!(routing_id = %id, version = updated.version, "routing updated");
        Ok(updated)
    }

    #[instrument(skip(self, input))]
    pub async fn add_operation(
        &self,
        team_id: Uuid,
        routing_id: Uuid,
        input: OperationInput,
    ) -> Result<routing_operation::Model, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;
        let routing = Self::find_routing(&txn, team_id, routing_id).await?;

        let sequence = match input.sequence {
            Some(seq) => seq,
            None => {
                let last = routing_operation::Entity::find()
                    .filter(routing_operation::Column::RoutingId.eq(routing_id))
                    .order_by_desc(routing_operation::Column::Sequence)
                    .one(&txn)
                    .await?;
                last.map_or(10, |op| op.sequence + 10)
            }
        };

        let operation = Self::insert_operation(&txn, team_id, routing_id, sequence, input).await?;
        Self::bump_version(&txn, routing).await?;
        txn.commit().await?;

        info!(routing_id = %routing_id, operation_id = %operation.id, "operation added");
        Ok(operation)
    }

    #[instrument(skip(self, input))]
    pub async fn update_operation(
        &self,
        team_id: Uuid,
        routing_id: Uuid,
        operation_id: Uuid,
        input: UpdateOperationInput,
    ) -> Result<routing_operation::Model, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;
        let routing = Self::find_routing(&txn, team_id, routing_id).await?;
        let operation = Self::find_operation(&txn, team_id, routing_id, operation_id).await?;

        let mut active = operation.into_active_model();
        if let Some(sequence) = input.sequence {
            active.sequence = Set(sequence);
        }
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(department) = input.department {
            active.department = Set(Some(department));
        }
        if let Some(setup) = input.setup_time_seconds {
            active.setup_time_seconds = Set(setup);
        }
        if let Some(run) = input.run_time_seconds {
            active.run_time_seconds = Set(run);
        }
        if let Some(instructions) = input.instructions {
            active.instructions = Set(Some(instructions));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        Self::bump_version(&txn, routing).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes an operation that no work order operation has been created from
    #[instrument(skip(self))]
    pub async fn delete_operation(
        &self,
        team_id: Uuid,
        routing_id: Uuid,
        operation_id: Uuid,
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let routing = Self::find_routing(&txn, team_id, routing_id).await?;
        let operation = Self::find_operation(&txn, team_id, routing_id, operation_id).await?;

        let in_use = work_order_operation::Entity::find()
            .filter(work_order_operation::Column::RoutingOperationId.eq(operation.id))
            .count(&txn)
            .await?;
        if in_use > 0 {
            return Err(ServiceError::Conflict(
                "Routing operation is used by existing work order operations".to_string(),
            ));
        }

        routing_operation::Entity::delete_by_id(operation.id)
            .exec(&txn)
            .await?;
        Self::bump_version(&txn, routing).await?;
        txn.commit().await?;

        info!(routing_id = %routing_id, operation_id = %operation_id, "operation deleted");
        Ok(())
    }

    #[instrument(skip(self, record), fields(file_id = %record.id))]
    pub async fn add_operation_attachment(
        &self,
        team_id: Uuid,
        routing_id: Uuid,
        operation_id: Uuid,
        record: FileRecord,
    ) -> Result<Vec<FileRecord>, ServiceError> {
        let operation = Self::find_operation(&*self.db, team_id, routing_id, operation_id).await?;
        let attachments = operation.attachments.with_added(record);
        self.store_operation_attachments(operation, attachments).await
    }

    #[instrument(skip(self))]
    pub async fn remove_operation_attachment(
        &self,
        team_id: Uuid,
        routing_id: Uuid,
        operation_id: Uuid,
        file_id: &str,
    ) -> Result<Vec<FileRecord>, ServiceError> {
        let operation = Self::find_operation(&*self.db, team_id, routing_id, operation_id).await?;
        let attachments = operation.attachments.without(file_id);
        self.store_operation_attachments(operation, attachments).await
    }

    async fn store_operation_attachments(
        &self,
        operation: routing_operation::Model,
        attachments: FileRecordList,
    ) -> Result<Vec<FileRecord>, ServiceError> {
        let mut active = operation.into_active_model();
        active.attachments = Set(attachments);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await.map_err(|e| {
            error!(error = %e, "failed to store operation attachments");
            ServiceError::DatabaseError(e)
        })?;
        Ok(updated.attachments.into_inner())
    }
}
