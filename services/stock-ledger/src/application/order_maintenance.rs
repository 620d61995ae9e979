//! 订单维护：状态变更、删除

use std::sync::Arc;

use fab_errors::{AppError, AppResult};
use tracing::{info, instrument};

use crate::application::audit_trail::{AuditTrail, ensure_actor_exists};
use crate::application::commands::{DeleteOrderCommand, UpdateOrderStatusCommand};
use crate::domain::entities::{AuditAction, AuditDetails, AuditEntity, AuditEntry, Order};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory, complete};
use crate::domain::value_objects::OrderId;

async fn find_order(uow: &dyn UnitOfWork, order_id: &OrderId) -> AppResult<Order> {
    uow.orders()
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))
}

pub struct OrderMaintenance {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl OrderMaintenance {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    pub async fn update_order_status(&self, cmd: UpdateOrderStatusCommand) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;
        let result = self.update_order_status_in(uow.as_ref(), cmd).await;
        complete(uow, result).await
    }

    /// 任意状态之间都允许切换，只要求目标状态编码存在
    #[instrument(skip(self, uow, cmd), fields(order_id = %cmd.order_id, status = %cmd.status_code))]
    pub async fn update_order_status_in(
        &self,
        uow: &dyn UnitOfWork,
        cmd: UpdateOrderStatusCommand,
    ) -> AppResult<()> {
        ensure_actor_exists(uow, &cmd.actor).await?;

        let status = uow
            .orders()
            .find_status_by_code(&cmd.status_code)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Order status '{}' not found", cmd.status_code))
            })?;
        let order = find_order(uow, &cmd.order_id).await?;

        uow.orders().update_status(&order.id, &status.id).await?;

        AuditTrail::record_in(
            uow,
            AuditEntry::new(
                AuditEntity::Order,
                order.id,
                AuditAction::UpdateStatus,
                AuditDetails::OrderStatusChanged {
                    from: order.status.code.clone(),
                    to: status.code.clone(),
                },
                cmd.actor,
            ),
        )
        .await?;

        info!(from = %order.status.code, to = %status.code, "Order status updated");
        Ok(())
    }

    pub async fn delete_order(&self, cmd: DeleteOrderCommand) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;
        let result = self.delete_order_in(uow.as_ref(), cmd).await;
        complete(uow, result).await
    }

    /// 删除订单行与订单头；已消耗的库存不回补，消耗出库单保留
    #[instrument(skip(self, uow, cmd), fields(order_id = %cmd.order_id))]
    pub async fn delete_order_in(&self, uow: &dyn UnitOfWork, cmd: DeleteOrderCommand) -> AppResult<()> {
        ensure_actor_exists(uow, &cmd.actor).await?;
        let order = find_order(uow, &cmd.order_id).await?;

        let line_count = uow.orders().delete(&order.id).await?;

        AuditTrail::record_in(
            uow,
            AuditEntry::new(
                AuditEntity::Order,
                order.id,
                AuditAction::Delete,
                AuditDetails::OrderDeleted { line_count },
                cmd.actor,
            ),
        )
        .await?;

        info!(line_count, "Order deleted");
        Ok(())
    }
}
