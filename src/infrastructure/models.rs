use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::report::{OrderItemSnapshot, OrderSnapshot};
use crate::schema::{order_items, orders};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub external_id: String,
    pub seller_id: Uuid,
    pub sold_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub external_id: String,
    pub seller_id: Uuid,
    pub sold_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl OrderItemRow {
    pub fn into_snapshot(self) -> OrderItemSnapshot {
        OrderItemSnapshot {
            id: self.id,
            order_id: self.order_id,
            product_id: self.product_id,
            store_id: self.store_id,
            quantity: self.quantity,
            unit_price: self.unit_price.to_string(),
            created_at: self.created_at,
        }
    }
}

impl OrderRow {
    pub fn into_snapshot(self, items: Vec<OrderItemRow>) -> OrderSnapshot {
        OrderSnapshot {
            id: self.id,
            external_id: self.external_id,
            seller_id: self.seller_id,
            sold_at: self.sold_at,
            created_at: self.created_at,
            order_items: items.into_iter().map(OrderItemRow::into_snapshot).collect(),
        }
    }
}
