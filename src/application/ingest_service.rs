//! The bulk ingestion pipeline: dedupe, create, summarize.
//!
//! All three entry points share one loop (`run_batch`) that classifies each
//! record as created, skipped or failed; they differ only in natural key and
//! entity shape. Records are processed strictly in input order and a failure
//! never aborts the batch; only the empty-batch usage error short-circuits.

use crate::domain::errors::DomainError;
use crate::domain::ports::IngestGateway;
use crate::domain::records::{OrderItemKey, OrderItemRecord, OrderRecord, OrderWithItemsRecord};
use crate::domain::report::{
    OrderBatchReport, OrderItemBatchReport, OrderItemSnapshot, OrderSnapshot, RecordError,
    RecordOutcome, SkippedOrder,
};
use crate::domain::validation;

pub struct IngestService<G> {
    gateway: G,
}

impl<G: IngestGateway> IngestService<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Dedupe and create standalone orders, keyed on `external_id`.
    pub fn load_orders(&self, records: Vec<OrderRecord>) -> Result<OrderBatchReport, DomainError> {
        if records.is_empty() {
            return Err(DomainError::EmptyBatch(validation::ORDERS_DATA_REQUIRED));
        }

        let (created, skipped, errors) = run_batch(&records, |record| self.ingest_order(record));
        log::info!(
            "order batch finished: {} created, {} skipped, {} errors",
            created.len(),
            skipped.len(),
            errors.len()
        );
        Ok(OrderBatchReport::new(created, skipped, errors))
    }

    /// Dedupe and create standalone order items, keyed on
    /// `(order_id, product_id, store_id)`.
    pub fn load_order_items(
        &self,
        records: Vec<OrderItemRecord>,
    ) -> Result<OrderItemBatchReport, DomainError> {
        if records.is_empty() {
            return Err(DomainError::EmptyBatch(validation::ORDER_ITEM_DATA_REQUIRED));
        }

        let (created, skipped, errors) =
            run_batch(&records, |record| self.ingest_order_item(record));
        log::info!(
            "order item batch finished: {} created, {} skipped, {} errors",
            created.len(),
            skipped.len(),
            errors.len()
        );
        Ok(OrderItemBatchReport::new(created, skipped, errors))
    }

    /// Create each order together with its item set as one atomic unit.
    /// Skips and errors are accounted at the order granularity: a skipped or
    /// failed order carries its items with it.
    pub fn load_orders_with_items(
        &self,
        records: Vec<OrderWithItemsRecord>,
    ) -> Result<OrderBatchReport, DomainError> {
        if records.is_empty() {
            return Err(DomainError::EmptyBatch(
                validation::ORDERS_WITH_ITEMS_DATA_REQUIRED,
            ));
        }

        let (created, skipped, errors) =
            run_batch(&records, |record| self.ingest_order_with_items(record));
        log::info!(
            "order-with-items batch finished: {} created, {} skipped, {} errors",
            created.len(),
            skipped.len(),
            errors.len()
        );
        Ok(OrderBatchReport::new(created, skipped, errors))
    }

    fn ingest_order(&self, record: &OrderRecord) -> RecordOutcome<OrderSnapshot, SkippedOrder> {
        let external_id = validation::external_id_of(record.external_id.as_deref());
        if !external_id.is_empty() {
            match self.gateway.order_exists(external_id) {
                Ok(true) => {
                    return RecordOutcome::Skipped(SkippedOrder {
                        external_id: external_id.to_string(),
                        seller_id: record.seller_id,
                    })
                }
                Ok(false) => {}
                Err(err) => return RecordOutcome::failed(record, err),
            }
        }

        match self.gateway.create_order(record) {
            Ok(snapshot) => RecordOutcome::Created(snapshot),
            Err(err) => RecordOutcome::failed(record, err),
        }
    }

    fn ingest_order_item(
        &self,
        record: &OrderItemRecord,
    ) -> RecordOutcome<OrderItemSnapshot, OrderItemKey> {
        // A partial key cannot match an existing row; create reports the
        // missing references.
        if let Some(key) = validation::order_item_key(record) {
            match self.gateway.order_item_exists(&key) {
                Ok(true) => return RecordOutcome::Skipped(key),
                Ok(false) => {}
                Err(err) => return RecordOutcome::failed(record, err),
            }
        }

        match self.gateway.create_order_item(record) {
            Ok(snapshot) => RecordOutcome::Created(snapshot),
            Err(err) => RecordOutcome::failed(record, err),
        }
    }

    fn ingest_order_with_items(
        &self,
        record: &OrderWithItemsRecord,
    ) -> RecordOutcome<OrderSnapshot, SkippedOrder> {
        let external_id = validation::external_id_of(record.external_id.as_deref());
        if !external_id.is_empty() {
            match self.gateway.order_exists(external_id) {
                Ok(true) => {
                    // Items are never created against a pre-existing order on
                    // this path; the whole record is one skip.
                    return RecordOutcome::Skipped(SkippedOrder {
                        external_id: external_id.to_string(),
                        seller_id: record.seller_id,
                    });
                }
                Ok(false) => {}
                Err(err) => return RecordOutcome::failed(record, err),
            }
        }

        match self.gateway.create_order_with_items(record) {
            Ok(snapshot) => RecordOutcome::Created(snapshot),
            Err(err) => RecordOutcome::failed(record, err),
        }
    }
}

/// Folds per-record outcomes into the three report buckets, preserving input
/// order within each bucket.
fn run_batch<R, S, K>(
    records: &[R],
    mut step: impl FnMut(&R) -> RecordOutcome<S, K>,
) -> (Vec<S>, Vec<K>, Vec<RecordError>) {
    let mut created = Vec::new();
    let mut skipped = Vec::new();
    let mut errors = Vec::new();

    for record in records {
        match step(record) {
            RecordOutcome::Created(snapshot) => created.push(snapshot),
            RecordOutcome::Skipped(key) => skipped.push(key),
            RecordOutcome::Failed(error) => errors.push(error),
        }
    }

    (created, skipped, errors)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::IngestService;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::IngestGateway;
    use crate::domain::records::{
        EmbeddedItemRecord, OrderItemRecord, OrderRecord, OrderWithItemsRecord,
    };
    use crate::infrastructure::memory::InMemoryIngestGateway;

    fn service() -> IngestService<InMemoryIngestGateway> {
        IngestService::new(InMemoryIngestGateway::new())
    }

    fn order_record(external_id: &str, seller_id: Uuid) -> OrderRecord {
        OrderRecord {
            external_id: Some(external_id.to_string()),
            seller_id: Some(seller_id),
            sold_at: None,
        }
    }

    fn item_record(order_id: Uuid, product_id: Uuid, store_id: Uuid) -> OrderItemRecord {
        OrderItemRecord {
            order_id: Some(order_id),
            product_id: Some(product_id),
            store_id: Some(store_id),
            quantity: Some(2),
            unit_price: Some("9.99".to_string()),
        }
    }

    fn embedded_item(product_id: Uuid, store_id: Uuid) -> EmbeddedItemRecord {
        EmbeddedItemRecord {
            product_id: Some(product_id),
            store_id: Some(store_id),
            quantity: Some(1),
            unit_price: Some("4.50".to_string()),
        }
    }

    fn combined_record(
        external_id: &str,
        seller_id: Uuid,
        items: Vec<EmbeddedItemRecord>,
    ) -> OrderWithItemsRecord {
        OrderWithItemsRecord {
            external_id: Some(external_id.to_string()),
            seller_id: Some(seller_id),
            sold_at: None,
            order_items: items,
        }
    }

    // ── load_orders ──────────────────────────────────────────────────────────

    #[test]
    fn empty_orders_batch_is_a_usage_error() {
        let service = service();

        let err = service.load_orders(vec![]).expect_err("should reject");

        assert!(matches!(err, DomainError::EmptyBatch("orders data required")));
        assert_eq!(service.gateway().order_count(), 0);
    }

    #[test]
    fn creates_new_orders() {
        let service = service();
        let seller_id = service.gateway().seed_seller();

        let report = service
            .load_orders(vec![order_record("ord-1", seller_id), order_record("ord-2", seller_id)])
            .expect("batch should run");

        assert!(report.success);
        assert_eq!(report.summary.total_created_orders, 2);
        assert_eq!(report.summary.total_skipped_orders, 0);
        assert_eq!(report.summary.total_errors, 0);
        assert_eq!(report.created_orders[0].external_id, "ord-1");
        assert_eq!(service.gateway().order_count(), 2);
    }

    #[test]
    fn skips_existing_order_and_creates_new_one() {
        let service = service();
        let seller_id = service.gateway().seed_seller();
        service
            .load_orders(vec![order_record("existing_order", seller_id)])
            .expect("seed batch should run");

        let report = service
            .load_orders(vec![
                order_record("existing_order", seller_id),
                order_record("new_order", seller_id),
            ])
            .expect("batch should run");

        assert!(report.success);
        assert_eq!(report.summary.total_created_orders, 1);
        assert_eq!(report.summary.total_skipped_orders, 1);
        assert_eq!(report.summary.total_errors, 0);
        assert_eq!(report.created_orders[0].external_id, "new_order");
        assert_eq!(report.skipped_orders[0].external_id, "existing_order");
        assert_eq!(report.skipped_orders[0].seller_id, Some(seller_id));
    }

    #[test]
    fn resubmitting_a_batch_creates_nothing() {
        let service = service();
        let seller_id = service.gateway().seed_seller();
        let batch = vec![order_record("ord-1", seller_id), order_record("ord-2", seller_id)];

        service.load_orders(batch.clone()).expect("first run");
        let report = service.load_orders(batch).expect("second run");

        assert_eq!(report.summary.total_created_orders, 0);
        assert_eq!(report.summary.total_skipped_orders, 2);
        assert_eq!(service.gateway().order_count(), 2);
    }

    #[test]
    fn blank_external_id_is_a_record_error_with_exact_message() {
        let service = service();
        let seller_id = service.gateway().seed_seller();

        let report = service
            .load_orders(vec![order_record("  ", seller_id)])
            .expect("batch should run");

        assert!(!report.success);
        assert_eq!(report.summary.total_errors, 1);
        assert_eq!(report.errors[0].errors, vec!["External can't be blank".to_string()]);
        assert_eq!(service.gateway().order_count(), 0);
    }

    #[test]
    fn unknown_seller_is_a_record_error() {
        let service = service();

        let report = service
            .load_orders(vec![order_record("ord-1", Uuid::new_v4())])
            .expect("batch should run");

        assert_eq!(report.errors[0].errors, vec!["Seller must exist".to_string()]);
    }

    #[test]
    fn record_error_echoes_the_input() {
        let service = service();
        let seller_id = service.gateway().seed_seller();

        let report = service
            .load_orders(vec![order_record("", seller_id)])
            .expect("batch should run");

        assert_eq!(report.errors[0].input["external_id"], "");
    }

    #[test]
    fn every_record_lands_in_exactly_one_bucket() {
        let service = service();
        let seller_id = service.gateway().seed_seller();
        service
            .load_orders(vec![order_record("existing_order", seller_id)])
            .expect("seed batch should run");

        let report = service
            .load_orders(vec![
                order_record("new_order", seller_id),
                order_record("existing_order", seller_id),
                order_record("", seller_id),
            ])
            .expect("batch should run");

        let total = report.summary.total_created_orders
            + report.summary.total_skipped_orders
            + report.summary.total_errors;
        assert_eq!(total, 3);
        assert!(!report.success);
    }

    #[test]
    fn second_new_record_with_same_key_is_skipped_within_the_batch() {
        // Inserts are visible immediately, so the duplicate's own existence
        // check catches it. See DESIGN.md on intra-batch duplicates.
        let service = service();
        let seller_id = service.gateway().seed_seller();

        let report = service
            .load_orders(vec![order_record("ord-1", seller_id), order_record("ord-1", seller_id)])
            .expect("batch should run");

        assert_eq!(report.summary.total_created_orders, 1);
        assert_eq!(report.summary.total_skipped_orders, 1);
        assert_eq!(service.gateway().order_count(), 1);
    }

    // ── load_order_items ─────────────────────────────────────────────────────

    #[test]
    fn empty_item_batch_is_a_usage_error() {
        let service = service();

        let err = service.load_order_items(vec![]).expect_err("should reject");

        assert!(matches!(err, DomainError::EmptyBatch("order item data required")));
    }

    #[test]
    fn skips_duplicate_item_and_creates_new_one() {
        let service = service();
        let gateway = service.gateway();
        let seller_id = gateway.seed_seller();
        let store_id = gateway.seed_store();
        let product_a = gateway.seed_product();
        let product_b = gateway.seed_product();
        let order = gateway
            .create_order(&order_record("ord-1", seller_id))
            .expect("order should persist");
        service
            .load_order_items(vec![item_record(order.id, product_a, store_id)])
            .expect("seed batch should run");

        let report = service
            .load_order_items(vec![
                item_record(order.id, product_a, store_id),
                item_record(order.id, product_b, store_id),
            ])
            .expect("batch should run");

        assert!(report.success);
        assert_eq!(report.summary.total_created_order_items, 1);
        assert_eq!(report.summary.total_skipped_order_items, 1);
        assert_eq!(report.skipped_order_items[0].product_id, product_a);
        assert_eq!(report.created_order_items[0].product_id, product_b);
        assert_eq!(service.gateway().order_item_count(), 2);
    }

    #[test]
    fn dangling_order_reference_is_a_record_error() {
        let service = service();
        let gateway = service.gateway();
        let store_id = gateway.seed_store();
        let product_id = gateway.seed_product();

        let report = service
            .load_order_items(vec![item_record(Uuid::new_v4(), product_id, store_id)])
            .expect("batch should run");

        assert!(!report.success);
        assert_eq!(report.errors[0].errors, vec!["Order must exist".to_string()]);
    }

    #[test]
    fn invalid_quantity_and_price_are_record_errors() {
        let service = service();
        let gateway = service.gateway();
        let seller_id = gateway.seed_seller();
        let store_id = gateway.seed_store();
        let product_id = gateway.seed_product();
        let order = gateway
            .create_order(&order_record("ord-1", seller_id))
            .expect("order should persist");

        let mut bad_quantity = item_record(order.id, product_id, store_id);
        bad_quantity.quantity = Some(0);
        let mut bad_price = item_record(order.id, product_id, store_id);
        bad_price.unit_price = Some("free".to_string());

        let report = service
            .load_order_items(vec![bad_quantity, bad_price])
            .expect("batch should run");

        assert_eq!(report.summary.total_errors, 2);
        assert_eq!(report.errors[0].errors, vec!["Quantity must be greater than 0".to_string()]);
        assert_eq!(report.errors[1].errors, vec!["Unit price is not a number".to_string()]);
        assert_eq!(service.gateway().order_item_count(), 0);
    }

    // ── load_orders_with_items ───────────────────────────────────────────────

    #[test]
    fn empty_combined_batch_is_a_usage_error() {
        let service = service();

        let err = service
            .load_orders_with_items(vec![])
            .expect_err("should reject");

        assert!(matches!(
            err,
            DomainError::EmptyBatch("orders with items data required")
        ));
    }

    #[test]
    fn creates_order_with_nested_items_atomically() {
        let service = service();
        let gateway = service.gateway();
        let seller_id = gateway.seed_seller();
        let store_id = gateway.seed_store();
        let product_a = gateway.seed_product();
        let product_b = gateway.seed_product();

        let report = service
            .load_orders_with_items(vec![combined_record(
                "ord-1",
                seller_id,
                vec![embedded_item(product_a, store_id), embedded_item(product_b, store_id)],
            )])
            .expect("batch should run");

        assert!(report.success);
        assert_eq!(report.summary.total_created_orders, 1);
        assert_eq!(report.created_orders[0].order_items.len(), 2);
        assert_eq!(service.gateway().order_item_count(), 2);
    }

    #[test]
    fn item_failure_rolls_back_the_whole_record() {
        let service = service();
        let gateway = service.gateway();
        let seller_id = gateway.seed_seller();
        let store_id = gateway.seed_store();
        let product_id = gateway.seed_product();

        let mut bad_item = embedded_item(product_id, store_id);
        bad_item.quantity = Some(-3);

        let report = service
            .load_orders_with_items(vec![
                combined_record("good_order", seller_id, vec![embedded_item(product_id, store_id)]),
                combined_record("bad_order", seller_id, vec![bad_item]),
            ])
            .expect("batch should run");

        assert!(!report.success);
        assert_eq!(report.summary.total_created_orders, 1);
        assert_eq!(report.summary.total_errors, 1);
        assert_eq!(report.errors[0].errors, vec!["Quantity must be greater than 0".to_string()]);
        // The failed order must not exist in any partial form.
        assert!(gateway
            .find_order_by_external_id("bad_order")
            .expect("lookup should work")
            .is_none());
        assert_eq!(service.gateway().order_count(), 1);
        assert_eq!(service.gateway().order_item_count(), 1);
    }

    #[test]
    fn dangling_product_reference_rolls_back_the_order() {
        let service = service();
        let gateway = service.gateway();
        let seller_id = gateway.seed_seller();
        let store_id = gateway.seed_store();

        let report = service
            .load_orders_with_items(vec![combined_record(
                "ord-1",
                seller_id,
                vec![embedded_item(Uuid::new_v4(), store_id)],
            )])
            .expect("batch should run");

        assert_eq!(report.errors[0].errors, vec!["Product must exist".to_string()]);
        assert_eq!(service.gateway().order_count(), 0);
    }

    #[test]
    fn existing_order_skips_the_whole_record_including_items() {
        let service = service();
        let gateway = service.gateway();
        let seller_id = gateway.seed_seller();
        let store_id = gateway.seed_store();
        let product_id = gateway.seed_product();
        service
            .load_orders(vec![order_record("existing_order", seller_id)])
            .expect("seed batch should run");

        let report = service
            .load_orders_with_items(vec![combined_record(
                "existing_order",
                seller_id,
                vec![embedded_item(product_id, store_id)],
            )])
            .expect("batch should run");

        assert_eq!(report.summary.total_skipped_orders, 1);
        assert_eq!(report.skipped_orders[0].external_id, "existing_order");
        // No item may be attached to the pre-existing order on this path.
        assert_eq!(service.gateway().order_item_count(), 0);
    }

    #[test]
    fn resubmitting_combined_batch_is_idempotent() {
        let service = service();
        let gateway = service.gateway();
        let seller_id = gateway.seed_seller();
        let store_id = gateway.seed_store();
        let product_id = gateway.seed_product();
        let batch = vec![combined_record(
            "ord-1",
            seller_id,
            vec![embedded_item(product_id, store_id)],
        )];

        service.load_orders_with_items(batch.clone()).expect("first run");
        let report = service.load_orders_with_items(batch).expect("second run");

        assert_eq!(report.summary.total_created_orders, 0);
        assert_eq!(report.summary.total_skipped_orders, 1);
        assert_eq!(service.gateway().order_count(), 1);
        assert_eq!(service.gateway().order_item_count(), 1);
    }
}
