use crate::{
    entities::{
        order::{self, OrderStatus},
        routing_operation,
        work_order_operation::{self, WooStatus},
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Iterable, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Production performance for operations completed inside a window
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub completed_operations: u64,
    pub completed_orders: u64,
    pub quantity_completed: i64,
    pub quantity_rejected: i64,
    /// Good units over all units, as a percentage; `None` when nothing was produced
    pub yield_percent: Option<f64>,
    pub average_cycle_seconds: Option<f64>,
    /// Share of scheduled operations finished by their scheduled end, as a percentage
    pub on_time_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveOperation {
    pub id: Uuid,
    pub order_id: Uuid,
    pub order_number: Option<String>,
    pub operation_title: Option<String>,
    pub status: WooStatus,
    pub operator_id: Option<Uuid>,
    pub actual_start: Option<DateTime<Utc>>,
}

/// Work in progress across the team
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WipSummary {
    pub counts: BTreeMap<String, u64>,
    pub open_orders: u64,
    pub active_operations: Vec<ActiveOperation>,
}

fn percent(part: u64, whole: u64) -> Option<f64> {
    (whole > 0).then(|| (part as f64 / whole as f64 * 10_000.0).round() / 100.0)
}

/// Folds completed operations into the summary figures
pub fn summarize_completed(
    operations: &[work_order_operation::Model],
) -> PerformanceSummary {
    let mut summary = PerformanceSummary {
        completed_operations: operations.len() as u64,
        ..Default::default()
    };

    let mut cycle_total = 0i64;
    let mut cycle_samples = 0u64;
    let mut scheduled = 0u64;
    let mut on_time = 0u64;

    for op in operations {
        summary.quantity_completed += i64::from(op.quantity_completed);
        summary.quantity_rejected += i64::from(op.quantity_rejected);

        if let (Some(start), Some(end)) = (op.actual_start, op.actual_end) {
            cycle_total += (end - start).num_seconds().max(0);
            cycle_samples += 1;
        }
        if let (Some(due), Some(end)) = (op.scheduled_end, op.actual_end) {
            scheduled += 1;
            if end <= due {
                on_time += 1;
            }
        }
    }

    let produced = summary.quantity_completed + summary.quantity_rejected;
    summary.yield_percent = percent(summary.quantity_completed.max(0) as u64, produced.max(0) as u64);
    summary.average_cycle_seconds =
        (cycle_samples > 0).then(|| cycle_total as f64 / cycle_samples as f64);
    summary.on_time_rate = percent(on_time, scheduled);
    summary
}

#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DatabaseConnection>,
}

impl AnalyticsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn performance(
        &self,
        team_id: Uuid,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<PerformanceSummary, ServiceError> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(ServiceError::ValidationError(
                    "endDate must not precede startDate".to_string(),
                ));
            }
        }

        let mut woo_window = Condition::all()
            .add(work_order_operation::Column::TeamId.eq(team_id))
            .add(work_order_operation::Column::Status.eq(WooStatus::Completed));
        let mut order_window = Condition::all()
            .add(order::Column::TeamId.eq(team_id))
            .add(order::Column::Status.eq(OrderStatus::Completed));
        if let Some(start) = start {
            woo_window = woo_window.add(work_order_operation::Column::ActualEnd.gte(start));
            order_window = order_window.add(order::Column::CompletedAt.gte(start));
        }
        if let Some(end) = end {
            woo_window = woo_window.add(work_order_operation::Column::ActualEnd.lt(end));
            order_window = order_window.add(order::Column::CompletedAt.lt(end));
        }

        let completed = work_order_operation::Entity::find()
            .filter(woo_window)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to load completed operations");
                ServiceError::DatabaseError(e)
            })?;
        let completed_orders = order::Entity::find()
            .filter(order_window)
            .count(&*self.db)
            .await?;

        let mut summary = summarize_completed(&completed);
        summary.completed_orders = completed_orders;
        summary.start_date = start;
        summary.end_date = end;
        Ok(summary)
    }

    #[instrument(skip(self))]
    pub async fn wip(&self, team_id: Uuid) -> Result<WipSummary, ServiceError> {
        let grouped: Vec<(WooStatus, i64)> = work_order_operation::Entity::find()
            .select_only()
            .column(work_order_operation::Column::Status)
            .column_as(work_order_operation::Column::Id.count(), "total")
            .filter(work_order_operation::Column::TeamId.eq(team_id))
            .group_by(work_order_operation::Column::Status)
            .into_tuple()
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to count operations by status");
                ServiceError::DatabaseError(e)
            })?;

        let mut counts: BTreeMap<String, u64> =
            WooStatus::iter().map(|s| (s.to_string(), 0)).collect();
        for (status, total) in grouped {
            counts.insert(status.to_string(), total.max(0) as u64);
        }

        let active = work_order_operation::Entity::find()
            .filter(work_order_operation::Column::TeamId.eq(team_id))
            .filter(
                work_order_operation::Column::Status
                    .is_in([WooStatus::InProgress, WooStatus::Paused]),
            )
            .order_by_asc(work_order_operation::Column::ActualStart)
            .find_also_related(order::Entity)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to load work in progress");
                ServiceError::DatabaseError(e)
            })?;

        let step_ids: Vec<Uuid> = active.iter().map(|(woo, _)| woo.routing_operation_id).collect();
        let titles: HashMap<Uuid, String> = if step_ids.is_empty() {
            HashMap::new()
        } else {
            routing_operation::Entity::find()
                .filter(routing_operation::Column::Id.is_in(step_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|step| (step.id, step.title))
                .collect()
        };

        let active_operations = active
            .into_iter()
            .map(|(woo, order)| ActiveOperation {
                id: woo.id,
                order_id: woo.order_id,
                order_number: order.map(|o| o.order_number),
                operation_title: titles.get(&woo.routing_operation_id).cloned(),
                status: woo.status,
                operator_id: woo.operator_id,
                actual_start: woo.actual_start,
            })
            .collect();

        let open_orders = order::Entity::find()
            .filter(order::Column::TeamId.eq(team_id))
            .filter(order::Column::Status.is_in([OrderStatus::Released, OrderStatus::InProgress]))
            .count(&*self.db)
            .await?;

        Ok(WipSummary {
            counts,
            open_orders,
            active_operations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::FileRecordList;
    use chrono::Duration;

    fn completed_op(
        good: i32,
        bad: i32,
        cycle_minutes: i64,
        late_by_minutes: Option<i64>,
    ) -> work_order_operation::Model {
        let end = Utc::now();
        work_order_operation::Model {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            routing_operation_id: Uuid::new_v4(),
            status: WooStatus::Completed,
            scheduled_start: None,
            scheduled_end: late_by_minutes.map(|m| end - Duration::minutes(m)),
            actual_start: Some(end - Duration::minutes(cycle_minutes)),
            actual_end: Some(end),
            operator_id: None,
            captured_data: None,
            quantity_completed: good,
            quantity_rejected: bad,
            notes: None,
            attachments: FileRecordList::default(),
            created_at: end,
            updated_at: end,
        }
    }

    #[test]
    fn empty_window_has_no_ratios() {
        let summary = summarize_completed(&[]);
        assert_eq!(summary.completed_operations, 0);
        assert_eq!(summary.yield_percent, None);
        assert_eq!(summary.average_cycle_seconds, None);
        assert_eq!(summary.on_time_rate, None);
    }

    #[test]
    fn computes_yield_cycle_and_on_time_rate() {
        let ops = vec![
            completed_op(90, 10, 10, Some(-5)),
            completed_op(45, 5, 20, Some(5)),
            completed_op(10, 0, 30, None),
        ];
        let summary = summarize_completed(&ops);

        assert_eq!(summary.completed_operations, 3);
        assert_eq!(summary.quantity_completed, 145);
        assert_eq!(summary.quantity_rejected, 15);
        assert_eq!(summary.yield_percent, Some(90.63));
        assert_eq!(summary.average_cycle_seconds, Some(1200.0));
        assert_eq!(summary.on_time_rate, Some(50.0));
    }
}
