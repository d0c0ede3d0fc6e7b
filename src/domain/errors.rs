use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Caller-usage error: the whole batch is rejected before any record is
    /// processed.
    #[error("{0}")]
    EmptyBatch(&'static str),
    /// Field-level or referential validation failure for a single record.
    /// The messages are the external contract and are reported verbatim.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("Internal error: {0}")]
    Internal(String),
}
