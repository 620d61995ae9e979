//! 查询

use std::sync::Arc;

use fab_common::PageWindow;
use fab_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{AuditRecord, MovementLine, Order, OrderLine, StockMovement};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory, complete};
use crate::domain::value_objects::OrderId;

/// 库存移动单及其明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementDetails {
    pub movement: StockMovement,
    pub lines: Vec<MovementLine>,
}

/// 订单、订单行及其自动出库单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub movements: Vec<MovementDetails>,
}

impl OrderDetails {
    /// 订购的产品总件数
    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }
}

async fn with_lines(
    uow: &dyn UnitOfWork,
    movements: Vec<StockMovement>,
) -> AppResult<Vec<MovementDetails>> {
    let mut details = Vec::with_capacity(movements.len());
    for movement in movements {
        let lines = uow.stock_movements().find_lines(&movement.id).await?;
        details.push(MovementDetails { movement, lines });
    }
    Ok(details)
}

pub struct AuditLogQuery {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl AuditLogQuery {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 审计记录，按时间倒序；limit 被限制在 1..=500
    pub async fn list_audit_records(&self, limit: u32, offset: u32) -> AppResult<Vec<AuditRecord>> {
        let uow = self.uow_factory.begin().await?;
        let result = uow.audit_records().list(PageWindow::new(limit, offset)).await;
        complete(uow, result).await
    }
}

/// 已提交订单与库存移动的只读视图
pub struct LedgerQuery {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl LedgerQuery {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    pub async fn find_order(&self, order_id: OrderId) -> AppResult<OrderDetails> {
        let uow = self.uow_factory.begin().await?;
        let result = Self::load_order(uow.as_ref(), order_id).await;
        complete(uow, result).await
    }

    /// 库存移动单，按时间倒序；limit 被限制在 1..=500
    pub async fn list_movements(&self, limit: u32, offset: u32) -> AppResult<Vec<MovementDetails>> {
        let uow = self.uow_factory.begin().await?;
        let result = match uow.stock_movements().list(PageWindow::new(limit, offset)).await {
            Ok(movements) => with_lines(uow.as_ref(), movements).await,
            Err(e) => Err(e),
        };
        complete(uow, result).await
    }

    async fn load_order(uow: &dyn UnitOfWork, order_id: OrderId) -> AppResult<OrderDetails> {
        let order = uow
            .orders()
            .find_by_id(&order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;
        let lines = uow.orders().find_lines(&order_id).await?;
        let movements = uow.stock_movements().list_for_order(&order_id).await?;

        Ok(OrderDetails {
            order,
            lines,
            movements: with_lines(uow, movements).await?,
        })
    }
}
