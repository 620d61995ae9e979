//! Application layer

pub mod audit_trail;
pub mod commands;
pub mod handler;
pub mod order_fulfillment;
pub mod order_maintenance;
pub mod parties;
pub mod queries;
pub mod retention;
pub mod scheduler;
pub mod stock_ledger;
pub mod stock_movements;

pub use audit_trail::AuditTrail;
pub use commands::*;
pub use handler::ServiceHandler;
pub use order_fulfillment::OrderFulfillmentCoordinator;
pub use order_maintenance::OrderMaintenance;
pub use queries::{AuditLogQuery, LedgerQuery, MovementDetails, OrderDetails};
pub use retention::RetentionPurger;
pub use scheduler::RetentionTask;
pub use stock_ledger::StockLedger;
pub use stock_movements::StockMovementRecorder;

#[cfg(test)]
mod tests;
