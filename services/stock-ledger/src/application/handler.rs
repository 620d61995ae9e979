//! 服务入口
//!
//! 对外暴露的全部操作，供外层（HTTP 等）调用。

use std::sync::Arc;

use fab_config::{InventoryConfig, RetentionConfig};
use fab_errors::AppResult;

use super::audit_trail::AuditTrail;
use super::commands::*;
use super::order_fulfillment::OrderFulfillmentCoordinator;
use super::order_maintenance::OrderMaintenance;
use super::queries::{AuditLogQuery, LedgerQuery, MovementDetails, OrderDetails};
use super::retention::RetentionPurger;
use super::stock_movements::StockMovementRecorder;
use crate::domain::entities::{AuditEntry, AuditRecord};
use crate::domain::unit_of_work::UnitOfWorkFactory;
use crate::domain::value_objects::OrderId;

pub struct ServiceHandler {
    audit_trail: AuditTrail,
    movements: StockMovementRecorder,
    orders: OrderFulfillmentCoordinator,
    maintenance: OrderMaintenance,
    purger: RetentionPurger,
    audit_log: AuditLogQuery,
    ledger: LedgerQuery,
}

impl ServiceHandler {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        inventory: InventoryConfig,
        retention: &RetentionConfig,
    ) -> Self {
        Self {
            audit_trail: AuditTrail::new(uow_factory.clone()),
            movements: StockMovementRecorder::new(uow_factory.clone(), inventory.clone()),
            orders: OrderFulfillmentCoordinator::new(uow_factory.clone(), inventory),
            maintenance: OrderMaintenance::new(uow_factory.clone()),
            purger: RetentionPurger::new(uow_factory.clone(), retention.min_years),
            audit_log: AuditLogQuery::new(uow_factory.clone()),
            ledger: LedgerQuery::new(uow_factory),
        }
    }

    // ========== 订单 ==========

    pub async fn create_order(&self, cmd: CreateOrderCommand) -> AppResult<OrderReceipt> {
        self.orders.create_order(cmd).await
    }

    pub async fn update_order_status(&self, cmd: UpdateOrderStatusCommand) -> AppResult<()> {
        self.maintenance.update_order_status(cmd).await
    }

    pub async fn delete_order(&self, cmd: DeleteOrderCommand) -> AppResult<()> {
        self.maintenance.delete_order(cmd).await
    }

    pub async fn find_order(&self, order_id: OrderId) -> AppResult<OrderDetails> {
        self.ledger.find_order(order_id).await
    }

    // ========== 库存 ==========

    pub async fn record_movement(&self, cmd: RecordMovementCommand) -> AppResult<MovementReceipt> {
        self.movements.record_movement(cmd).await
    }

    pub async fn list_movements(&self, limit: u32, offset: u32) -> AppResult<Vec<MovementDetails>> {
        self.ledger.list_movements(limit, offset).await
    }

    // ========== 维护 ==========

    pub async fn purge(&self, cmd: PurgeCommand) -> AppResult<PurgeReport> {
        self.purger.purge(cmd).await
    }

    // ========== 审计 ==========

    /// 独立写入一条审计记录
    pub async fn record_audit(&self, entry: AuditEntry) -> AppResult<AuditRecord> {
        self.audit_trail.record(entry).await
    }

    pub async fn list_audit_records(&self, limit: u32, offset: u32) -> AppResult<Vec<AuditRecord>> {
        self.audit_log.list_audit_records(limit, offset).await
    }
}
