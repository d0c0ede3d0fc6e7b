use super::errors::DomainError;
use super::records::{OrderItemKey, OrderItemRecord, OrderRecord, OrderWithItemsRecord};
use super::report::{OrderItemSnapshot, OrderSnapshot};

/// Capability set the ingestion pipeline requires from the persistence layer.
///
/// Injected at service construction so the batch logic can run against the
/// Diesel-backed gateway in production and an in-memory fake in tests. The
/// gateway is the authority on validation and referential integrity; creation
/// failures surface as `DomainError::Validation` with contract wording.
pub trait IngestGateway: Send + Sync + 'static {
    fn order_exists(&self, external_id: &str) -> Result<bool, DomainError>;

    fn create_order(&self, record: &OrderRecord) -> Result<OrderSnapshot, DomainError>;

    fn find_order_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<OrderSnapshot>, DomainError>;

    fn order_item_exists(&self, key: &OrderItemKey) -> Result<bool, DomainError>;

    fn create_order_item(&self, record: &OrderItemRecord)
        -> Result<OrderItemSnapshot, DomainError>;

    /// Creates the order and all of its items inside one scoped transaction:
    /// either every row is persisted or none are.
    fn create_order_with_items(
        &self,
        record: &OrderWithItemsRecord,
    ) -> Result<OrderSnapshot, DomainError>;
}
