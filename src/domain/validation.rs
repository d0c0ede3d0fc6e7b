//! Field-level validation and the human-readable messages it produces.
//!
//! The message strings are asserted verbatim by downstream consumers, so they
//! live here as named constants and every gateway implementation goes through
//! these helpers rather than wording its own.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::records::{
    EmbeddedItemCandidate, EmbeddedItemRecord, OrderCandidate, OrderItemCandidate, OrderItemKey,
    OrderItemRecord, OrderRecord, OrderWithItemsRecord,
};

pub const EXTERNAL_BLANK: &str = "External can't be blank";
pub const SELLER_MUST_EXIST: &str = "Seller must exist";
pub const ORDER_MUST_EXIST: &str = "Order must exist";
pub const PRODUCT_MUST_EXIST: &str = "Product must exist";
pub const STORE_MUST_EXIST: &str = "Store must exist";
pub const QUANTITY_NOT_A_NUMBER: &str = "Quantity is not a number";
pub const QUANTITY_NOT_POSITIVE: &str = "Quantity must be greater than 0";
pub const UNIT_PRICE_NOT_A_NUMBER: &str = "Unit price is not a number";
pub const EXTERNAL_TAKEN: &str = "External has already been taken";
pub const PRODUCT_TAKEN: &str = "Product has already been taken";

pub const ORDERS_DATA_REQUIRED: &str = "orders data required";
pub const ORDER_ITEM_DATA_REQUIRED: &str = "order item data required";
pub const ORDERS_WITH_ITEMS_DATA_REQUIRED: &str = "orders with items data required";

/// The trimmed external id of an order-shaped record, empty when absent.
pub fn external_id_of(external_id: Option<&str>) -> &str {
    external_id.map(str::trim).unwrap_or_default()
}

pub fn order_candidate(record: &OrderRecord) -> Result<OrderCandidate, Vec<String>> {
    order_fields_candidate(record.external_id.as_deref(), record.seller_id, record.sold_at)
}

fn order_fields_candidate(
    external_id: Option<&str>,
    seller_id: Option<Uuid>,
    sold_at: Option<DateTime<Utc>>,
) -> Result<OrderCandidate, Vec<String>> {
    let mut messages = Vec::new();

    let external_id = external_id_of(external_id);
    if external_id.is_empty() {
        messages.push(EXTERNAL_BLANK.to_string());
    }

    let Some(seller_id) = seller_id else {
        messages.push(SELLER_MUST_EXIST.to_string());
        return Err(messages);
    };

    if !messages.is_empty() {
        return Err(messages);
    }

    Ok(OrderCandidate {
        external_id: external_id.to_string(),
        seller_id,
        sold_at,
    })
}

/// Natural key of a standalone item record, if all three references are given.
/// A partial key cannot match anything, so callers fall through to `create`
/// and let validation report the missing references.
pub fn order_item_key(record: &OrderItemRecord) -> Option<OrderItemKey> {
    Some(OrderItemKey {
        order_id: record.order_id?,
        product_id: record.product_id?,
        store_id: record.store_id?,
    })
}

pub fn order_item_candidate(record: &OrderItemRecord) -> Result<OrderItemCandidate, Vec<String>> {
    let mut messages = Vec::new();

    if record.order_id.is_none() {
        messages.push(ORDER_MUST_EXIST.to_string());
    }
    if record.product_id.is_none() {
        messages.push(PRODUCT_MUST_EXIST.to_string());
    }
    if record.store_id.is_none() {
        messages.push(STORE_MUST_EXIST.to_string());
    }
    let quantity = quantity_value(record.quantity, &mut messages);
    let unit_price = unit_price_value(record.unit_price.as_deref(), &mut messages);

    match (record.order_id, record.product_id, record.store_id, quantity, unit_price) {
        (Some(order_id), Some(product_id), Some(store_id), Some(quantity), Some(unit_price)) => {
            Ok(OrderItemCandidate {
                key: OrderItemKey {
                    order_id,
                    product_id,
                    store_id,
                },
                quantity,
                unit_price,
            })
        }
        _ => Err(messages),
    }
}

pub fn embedded_item_candidate(
    record: &EmbeddedItemRecord,
) -> Result<EmbeddedItemCandidate, Vec<String>> {
    let mut messages = Vec::new();

    if record.product_id.is_none() {
        messages.push(PRODUCT_MUST_EXIST.to_string());
    }
    if record.store_id.is_none() {
        messages.push(STORE_MUST_EXIST.to_string());
    }
    let quantity = quantity_value(record.quantity, &mut messages);
    let unit_price = unit_price_value(record.unit_price.as_deref(), &mut messages);

    match (record.product_id, record.store_id, quantity, unit_price) {
        (Some(product_id), Some(store_id), Some(quantity), Some(unit_price)) => {
            Ok(EmbeddedItemCandidate {
                product_id,
                store_id,
                quantity,
                unit_price,
            })
        }
        _ => Err(messages),
    }
}

/// Validates an order-with-items record in one pass, accumulating the order's
/// messages and every item's messages so the whole record is reported once.
pub fn order_with_items_candidate(
    record: &OrderWithItemsRecord,
) -> Result<(OrderCandidate, Vec<EmbeddedItemCandidate>), Vec<String>> {
    let mut messages = Vec::new();

    let order = match order_fields_candidate(
        record.external_id.as_deref(),
        record.seller_id,
        record.sold_at,
    ) {
        Ok(candidate) => Some(candidate),
        Err(mut order_messages) => {
            messages.append(&mut order_messages);
            None
        }
    };

    let mut items = Vec::with_capacity(record.order_items.len());
    for item in &record.order_items {
        match embedded_item_candidate(item) {
            Ok(candidate) => items.push(candidate),
            Err(mut item_messages) => messages.append(&mut item_messages),
        }
    }

    match order {
        Some(order) if messages.is_empty() => Ok((order, items)),
        _ => Err(messages),
    }
}

fn quantity_value(quantity: Option<i32>, messages: &mut Vec<String>) -> Option<i32> {
    match quantity {
        None => {
            messages.push(QUANTITY_NOT_A_NUMBER.to_string());
            None
        }
        Some(quantity) if quantity <= 0 => {
            messages.push(QUANTITY_NOT_POSITIVE.to_string());
            None
        }
        Some(quantity) => Some(quantity),
    }
}

fn unit_price_value(raw: Option<&str>, messages: &mut Vec<String>) -> Option<BigDecimal> {
    match raw.map(str::trim).filter(|s| !s.is_empty()).map(BigDecimal::from_str) {
        Some(Ok(price)) => Some(price),
        _ => {
            messages.push(UNIT_PRICE_NOT_A_NUMBER.to_string());
            None
        }
    }
}
