pub mod gateway;
pub mod memory;
pub mod models;

pub use gateway::DieselIngestGateway;
pub use memory::InMemoryIngestGateway;
