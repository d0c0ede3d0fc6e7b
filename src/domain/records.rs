use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ── Batch input records ──────────────────────────────────────────────────────
//
// External payloads are loosely typed: every field is optional so that a
// missing or malformed value becomes a per-record validation error instead of
// failing deserialization of the whole batch.

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderRecord {
    pub external_id: Option<String>,
    pub seller_id: Option<Uuid>,
    pub sold_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemRecord {
    pub order_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub quantity: Option<i32>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderWithItemsRecord {
    pub external_id: Option<String>,
    pub seller_id: Option<Uuid>,
    pub sold_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_items: Vec<EmbeddedItemRecord>,
}

/// Item payload nested under an order-with-items record. Carries no order
/// reference of its own: it is bound to the enclosing order at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmbeddedItemRecord {
    pub product_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub unit_price: Option<String>,
}

/// Natural key of a standalone order item. Two items sharing this triple are
/// the same logical item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct OrderItemKey {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub store_id: Uuid,
}

// ── Validated candidates ─────────────────────────────────────────────────────
//
// Produced by `validation` once field-level checks pass; gateways only ever
// persist candidates, never raw records.

#[derive(Debug, Clone)]
pub struct OrderCandidate {
    pub external_id: String,
    pub seller_id: Uuid,
    pub sold_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct OrderItemCandidate {
    pub key: OrderItemKey,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct EmbeddedItemCandidate {
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}
