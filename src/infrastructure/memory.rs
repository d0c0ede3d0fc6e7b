//! In-memory gateway used by the unit tests (and handy for local
//! experiments). It mirrors the Diesel gateway's behavior exactly: same
//! validation helpers, same message wording, same natural-key uniqueness,
//! and an all-or-nothing combined path.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::IngestGateway;
use crate::domain::records::{
    EmbeddedItemCandidate, OrderCandidate, OrderItemKey, OrderItemRecord, OrderRecord,
    OrderWithItemsRecord,
};
use crate::domain::report::{OrderItemSnapshot, OrderSnapshot};
use crate::domain::validation;

#[derive(Debug, Default)]
struct State {
    sellers: HashSet<Uuid>,
    products: HashSet<Uuid>,
    stores: HashSet<Uuid>,
    orders: Vec<OrderSnapshot>,
    order_items: Vec<OrderItemSnapshot>,
}

#[derive(Debug, Default)]
pub struct InMemoryIngestGateway {
    state: Mutex<State>,
}

impl InMemoryIngestGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_seller(&self) -> Uuid {
        let id = Uuid::new_v4();
        if let Ok(mut state) = self.state.lock() {
            state.sellers.insert(id);
        }
        id
    }

    pub fn seed_product(&self) -> Uuid {
        let id = Uuid::new_v4();
        if let Ok(mut state) = self.state.lock() {
            state.products.insert(id);
        }
        id
    }

    pub fn seed_store(&self) -> Uuid {
        let id = Uuid::new_v4();
        if let Ok(mut state) = self.state.lock() {
            state.stores.insert(id);
        }
        id
    }

    pub fn order_count(&self) -> usize {
        self.state.lock().map(|state| state.orders.len()).unwrap_or(0)
    }

    pub fn order_item_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.order_items.len())
            .unwrap_or(0)
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Internal("gateway state lock poisoned".to_string()))
    }
}

impl State {
    fn order_key_taken(&self, external_id: &str) -> bool {
        self.orders.iter().any(|order| order.external_id == external_id)
    }

    fn item_key_taken(&self, key: &OrderItemKey) -> bool {
        self.order_items.iter().any(|item| {
            item.order_id == key.order_id
                && item.product_id == key.product_id
                && item.store_id == key.store_id
        })
    }

    fn check_seller(&self, candidate: &OrderCandidate) -> Result<(), DomainError> {
        if !self.sellers.contains(&candidate.seller_id) {
            return Err(DomainError::Validation(vec![
                validation::SELLER_MUST_EXIST.to_string(),
            ]));
        }
        Ok(())
    }

    fn check_item_references(&self, item: &EmbeddedItemCandidate) -> Result<(), DomainError> {
        let mut messages = Vec::new();
        if !self.products.contains(&item.product_id) {
            messages.push(validation::PRODUCT_MUST_EXIST.to_string());
        }
        if !self.stores.contains(&item.store_id) {
            messages.push(validation::STORE_MUST_EXIST.to_string());
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(messages))
        }
    }

    fn insert_order(&mut self, candidate: &OrderCandidate) -> Result<OrderSnapshot, DomainError> {
        if self.order_key_taken(&candidate.external_id) {
            return Err(DomainError::Validation(vec![
                validation::EXTERNAL_TAKEN.to_string(),
            ]));
        }
        let snapshot = OrderSnapshot {
            id: Uuid::new_v4(),
            external_id: candidate.external_id.clone(),
            seller_id: candidate.seller_id,
            sold_at: candidate.sold_at,
            created_at: Utc::now(),
            order_items: Vec::new(),
        };
        self.orders.push(snapshot.clone());
        Ok(snapshot)
    }

    fn insert_item(
        &mut self,
        order_id: Uuid,
        item: &EmbeddedItemCandidate,
    ) -> Result<OrderItemSnapshot, DomainError> {
        let key = OrderItemKey {
            order_id,
            product_id: item.product_id,
            store_id: item.store_id,
        };
        if self.item_key_taken(&key) {
            return Err(DomainError::Validation(vec![
                validation::PRODUCT_TAKEN.to_string(),
            ]));
        }
        let snapshot = OrderItemSnapshot {
            id: Uuid::new_v4(),
            order_id,
            product_id: item.product_id,
            store_id: item.store_id,
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            created_at: Utc::now(),
        };
        self.order_items.push(snapshot.clone());
        Ok(snapshot)
    }
}

impl IngestGateway for InMemoryIngestGateway {
    fn order_exists(&self, external_id: &str) -> Result<bool, DomainError> {
        Ok(self.state()?.order_key_taken(external_id))
    }

    fn create_order(&self, record: &OrderRecord) -> Result<OrderSnapshot, DomainError> {
        let candidate = validation::order_candidate(record).map_err(DomainError::Validation)?;
        let mut state = self.state()?;
        state.check_seller(&candidate)?;
        state.insert_order(&candidate)
    }

    fn find_order_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<OrderSnapshot>, DomainError> {
        let state = self.state()?;
        let Some(order) = state
            .orders
            .iter()
            .find(|order| order.external_id == external_id)
        else {
            return Ok(None);
        };
        let mut snapshot = order.clone();
        snapshot.order_items = state
            .order_items
            .iter()
            .filter(|item| item.order_id == order.id)
            .cloned()
            .collect();
        Ok(Some(snapshot))
    }

    fn order_item_exists(&self, key: &OrderItemKey) -> Result<bool, DomainError> {
        Ok(self.state()?.item_key_taken(key))
    }

    fn create_order_item(
        &self,
        record: &OrderItemRecord,
    ) -> Result<OrderItemSnapshot, DomainError> {
        let candidate = validation::order_item_candidate(record).map_err(DomainError::Validation)?;
        let mut state = self.state()?;

        let mut messages = Vec::new();
        if !state.orders.iter().any(|order| order.id == candidate.key.order_id) {
            messages.push(validation::ORDER_MUST_EXIST.to_string());
        }
        if !state.products.contains(&candidate.key.product_id) {
            messages.push(validation::PRODUCT_MUST_EXIST.to_string());
        }
        if !state.stores.contains(&candidate.key.store_id) {
            messages.push(validation::STORE_MUST_EXIST.to_string());
        }
        if !messages.is_empty() {
            return Err(DomainError::Validation(messages));
        }

        let embedded = EmbeddedItemCandidate {
            product_id: candidate.key.product_id,
            store_id: candidate.key.store_id,
            quantity: candidate.quantity,
            unit_price: candidate.unit_price.clone(),
        };
        state.insert_item(candidate.key.order_id, &embedded)
    }

    fn create_order_with_items(
        &self,
        record: &OrderWithItemsRecord,
    ) -> Result<OrderSnapshot, DomainError> {
        let (order, items) =
            validation::order_with_items_candidate(record).map_err(DomainError::Validation)?;
        let mut state = self.state()?;

        // Atomicity: every check runs before the first insert, so a failure
        // leaves no partial state behind.
        state.check_seller(&order)?;
        if state.order_key_taken(&order.external_id) {
            return Err(DomainError::Validation(vec![
                validation::EXTERNAL_TAKEN.to_string(),
            ]));
        }
        for item in &items {
            state.check_item_references(item)?;
        }

        let mut snapshot = state.insert_order(&order)?;
        for item in &items {
            snapshot.order_items.push(state.insert_item(snapshot.id, item)?);
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(external_id: &str, seller_id: Uuid) -> OrderRecord {
        OrderRecord {
            external_id: Some(external_id.to_string()),
            seller_id: Some(seller_id),
            sold_at: None,
        }
    }

    #[test]
    fn duplicate_insert_surfaces_the_uniqueness_backstop() {
        // Models two concurrent loaders racing past the existence check: the
        // second direct insert must fail like a unique-constraint violation.
        let gateway = InMemoryIngestGateway::new();
        let seller_id = gateway.seed_seller();

        gateway.create_order(&record("ord-1", seller_id)).expect("first insert");
        let err = gateway
            .create_order(&record("ord-1", seller_id))
            .expect_err("second insert should fail");

        match err {
            DomainError::Validation(messages) => {
                assert_eq!(messages, vec!["External has already been taken".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(gateway.order_count(), 1);
    }

    #[test]
    fn find_order_assembles_nested_items() {
        let gateway = InMemoryIngestGateway::new();
        let seller_id = gateway.seed_seller();
        let product_id = gateway.seed_product();
        let store_id = gateway.seed_store();

        let created = gateway
            .create_order_with_items(&OrderWithItemsRecord {
                external_id: Some("ord-1".to_string()),
                seller_id: Some(seller_id),
                sold_at: None,
                order_items: vec![crate::domain::records::EmbeddedItemRecord {
                    product_id: Some(product_id),
                    store_id: Some(store_id),
                    quantity: Some(2),
                    unit_price: Some("3.50".to_string()),
                }],
            })
            .expect("create failed");
        assert_eq!(created.order_items.len(), 1);

        let found = gateway
            .find_order_by_external_id("ord-1")
            .expect("find failed")
            .expect("order should exist");
        assert_eq!(found.order_items.len(), 1);
        assert_eq!(found.order_items[0].unit_price, "3.50");
    }
}
