use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::records::OrderItemKey;

// ── Entity snapshots ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemSnapshot {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub quantity: i32,
    /// Decimal price rendered as a string, e.g. "9.99"
    pub unit_price: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderSnapshot {
    pub id: Uuid,
    pub external_id: String,
    pub seller_id: Uuid,
    pub sold_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub order_items: Vec<OrderItemSnapshot>,
}

/// Natural-key echo for an order that matched an already-persisted record.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkippedOrder {
    pub external_id: String,
    pub seller_id: Option<Uuid>,
}

// ── Per-record outcome ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordError {
    /// The offending input, echoed for caller debugging.
    #[schema(value_type = Object)]
    pub input: Value,
    pub errors: Vec<String>,
}

/// Classification of a single input record. Every record lands in exactly one
/// variant; the batch loop folds these into the report.
#[derive(Debug)]
pub enum RecordOutcome<S, K> {
    Created(S),
    Skipped(K),
    Failed(RecordError),
}

impl<S, K> RecordOutcome<S, K> {
    pub fn failed<R: Serialize>(record: &R, err: DomainError) -> Self {
        let input = serde_json::to_value(record).unwrap_or(Value::Null);
        let errors = match err {
            DomainError::Validation(messages) => messages,
            other => vec![other.to_string()],
        };
        RecordOutcome::Failed(RecordError { input, errors })
    }
}

// ── Batch reports ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderBatchSummary {
    pub total_created_orders: usize,
    pub total_skipped_orders: usize,
    pub total_errors: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderBatchReport {
    pub success: bool,
    pub summary: OrderBatchSummary,
    pub created_orders: Vec<OrderSnapshot>,
    pub skipped_orders: Vec<SkippedOrder>,
    pub errors: Vec<RecordError>,
}

impl OrderBatchReport {
    pub fn new(
        created_orders: Vec<OrderSnapshot>,
        skipped_orders: Vec<SkippedOrder>,
        errors: Vec<RecordError>,
    ) -> Self {
        Self {
            success: errors.is_empty(),
            summary: OrderBatchSummary {
                total_created_orders: created_orders.len(),
                total_skipped_orders: skipped_orders.len(),
                total_errors: errors.len(),
            },
            created_orders,
            skipped_orders,
            errors,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemBatchSummary {
    pub total_created_order_items: usize,
    pub total_skipped_order_items: usize,
    pub total_errors: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemBatchReport {
    pub success: bool,
    pub summary: OrderItemBatchSummary,
    pub created_order_items: Vec<OrderItemSnapshot>,
    pub skipped_order_items: Vec<OrderItemKey>,
    pub errors: Vec<RecordError>,
}

impl OrderItemBatchReport {
    pub fn new(
        created_order_items: Vec<OrderItemSnapshot>,
        skipped_order_items: Vec<OrderItemKey>,
        errors: Vec<RecordError>,
    ) -> Self {
        Self {
            success: errors.is_empty(),
            summary: OrderItemBatchSummary {
                total_created_order_items: created_order_items.len(),
                total_skipped_order_items: skipped_order_items.len(),
                total_errors: errors.len(),
            },
            created_order_items,
            skipped_order_items,
            errors,
        }
    }
}
