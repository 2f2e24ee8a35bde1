use crate::{
    entities::{
        file_record::FileRecordList,
        order::{self, OrderStatus},
        routing, routing_operation,
        work_order_operation::{self, WooStatus},
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Input for creating a production order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    #[validate(length(min = 1, max = 64))]
    pub order_number: String,
    #[validate(length(min = 1, max = 255))]
    pub product_name: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub routing_id: Option<Uuid>,
    /// Initial status; only `planned` (default) and `released` are accepted
    pub status: Option<OrderStatus>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Order together with its work order operations
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: order::Model,
    pub operations: Vec<work_order_operation::Model>,
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists the team's orders, newest first
    #[instrument(skip(self))]
    pub async fn list(&self, team_id: Uuid) -> Result<Vec<order::Model>, ServiceError> {
        order::Entity::find()
            .filter(order::Column::TeamId.eq(team_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to list orders");
                ServiceError::DatabaseError(e)
            })
    }

    async fn find(&self, team_id: Uuid, id: Uuid) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(id)
            .filter(order::Column::TeamId.eq(team_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order"))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, team_id: Uuid, id: Uuid) -> Result<OrderDetail, ServiceError> {
        let order = self.find(team_id, id).await?;
        let operations = work_order_operation::Entity::find()
            .filter(work_order_operation::Column::OrderId.eq(order.id))
            .filter(work_order_operation::Column::TeamId.eq(team_id))
            .join(
                JoinType::InnerJoin,
                work_order_operation::Relation::RoutingOperation.def(),
            )
            .order_by_asc(routing_operation::Column::Sequence)
            .all(&*self.db)
            .await?;
        Ok(OrderDetail { order, operations })
    }

    /// Creates an order; with a routing, one pending operation is created per routing step.
    #[instrument(skip(self, input), fields(order_number = %input.order_number))]
    pub async fn create(
        &self,
        team_id: Uuid,
        input: CreateOrderInput,
    ) -> Result<OrderDetail, ServiceError> {
        input.validate()?;

        let status = input.status.unwrap_or(OrderStatus::Planned);
        if !matches!(status, OrderStatus::Planned | OrderStatus::Released) {
            return Err(ServiceError::ValidationError(
                "New orders must be planned or released".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (input.scheduled_start, input.scheduled_end) {
            if end < start {
                return Err(ServiceError::ValidationError(
                    "scheduledEnd must not precede scheduledStart".to_string(),
                ));
            }
        }

        let duplicate = order::Entity::find()
            .filter(order::Column::TeamId.eq(team_id))
            .filter(order::Column::OrderNumber.eq(input.order_number.clone()))
            .one(&*self.db)
            .await?;
        if duplicate.is_some() {
            return Err(duplicate_order_number(&input.order_number));
        }
        let order_number = input.order_number;

        let steps = match input.routing_id {
            Some(routing_id) => {
                routing::Entity::find_by_id(routing_id)
                    .filter(routing::Column::TeamId.eq(team_id))
                    .one(&*self.db)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Routing"))?;
                routing_operation::Entity::find()
                    .filter(routing_operation::Column::RoutingId.eq(routing_id))
                    .order_by_asc(routing_operation::Column::Sequence)
                    .all(&*self.db)
                    .await?
            }
            None => Vec::new(),
        };

        // The order insert opens the write so concurrent creates queue on the lock
        let txn = self.db.begin().await?;

        let order = order::ActiveModel {
            team_id: Set(team_id),
            order_number: Set(order_number.clone()),
            product_name: Set(input.product_name),
            quantity: Set(input.quantity),
            status: Set(status),
            routing_id: Set(input.routing_id),
            scheduled_start: Set(input.scheduled_start),
            scheduled_end: Set(input.scheduled_end),
            completed_at: Set(None),
            notes: Set(input.notes),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                warn!(order_number = %order_number, "order number taken by a concurrent create");
                duplicate_order_number(&order_number)
            }
            _ => {
                error!(error = %e, "failed to insert order");
                ServiceError::DatabaseError(e)
            }
        })?;

        let now = Utc::now();
        let mut operations = Vec::with_capacity(steps.len());
        for step in steps {
            let woo = work_order_operation::ActiveModel {
                id: Set(Uuid::new_v4()),
                team_id: Set(team_id),
                order_id: Set(order.id),
                routing_operation_id: Set(step.id),
                status: Set(WooStatus::Pending),
                scheduled_start: Set(order.scheduled_start),
                scheduled_end: Set(order.scheduled_end),
                actual_start: Set(None),
                actual_end: Set(None),
                operator_id: Set(None),
                captured_data: Set(None),
                quantity_completed: Set(0),
                quantity_rejected: Set(0),
                notes: Set(None),
                attachments: Set(FileRecordList::default()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            operations.push(woo);
        }

        txn.commit().await?;

        info!(
            order_id = %order.id,
            operations = operations.len(),
            "order created"
        );
        Ok(OrderDetail { order, operations })
    }

    /// Marks the order completed. Completed and cancelled orders cannot be completed again.
    #[instrument(skip(self))]
    pub async fn complete_order(
        &self,
        team_id: Uuid,
        id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        let order = self.find(team_id, id).await?;
        if matches!(order.status, OrderStatus::Completed | OrderStatus::Cancelled) {
            return Err(ServiceError::InvalidTransition {
                entity: "order",
                action: "complete",
                from: order.status.to_string(),
            });
        }

        let mut active = order.into_active_model();
        active.status = Set(OrderStatus::Completed);
        active.completed_at = Set(Some(Utc::now()));
        let updated = active.update(&*self.db).await.map_err(|e| {
            error!(error = %e, order_id = %id, "failed to complete order");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %id, "order completed");
        Ok(updated)
    }
}

fn duplicate_order_number(order_number: &str) -> ServiceError {
    ServiceError::Conflict(format!("Order number {order_number} already exists"))
}
