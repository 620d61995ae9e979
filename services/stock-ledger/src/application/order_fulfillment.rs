//! 订单履约
//!
//! 订单头、订单行、消耗出库单、库存扣减和一条审计记录在同一事务中提交。

use std::collections::HashMap;
use std::sync::Arc;

use fab_config::InventoryConfig;
use fab_errors::{AppError, AppResult};
use metrics::counter;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::application::audit_trail::{AuditTrail, ensure_actor_exists};
use crate::application::commands::{CreateOrderCommand, OrderReceipt};
use crate::application::parties::resolve_customer;
use crate::application::stock_ledger::StockLedger;
use crate::application::stock_movements::find_stock_type;
use crate::domain::entities::{
    AuditAction, AuditDetails, AuditEntity, AuditEntry, Direction, Order, OrderLine, Product,
    StockMovement, ensure_storable_amount,
};
use crate::domain::requirements::MaterialRequirements;
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory, complete};
use crate::domain::value_objects::ProductId;

pub struct OrderFulfillmentCoordinator {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    inventory: InventoryConfig,
}

impl OrderFulfillmentCoordinator {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, inventory: InventoryConfig) -> Self {
        Self {
            uow_factory,
            inventory,
        }
    }

    /// 创建订单（自己拥有事务）
    pub async fn create_order(&self, cmd: CreateOrderCommand) -> AppResult<OrderReceipt> {
        let uow = self.uow_factory.begin().await?;
        let result = self.create_order_in(uow.as_ref(), cmd).await;
        let result = complete(uow, result).await;

        match &result {
            Ok(receipt) => {
                counter!("stock_orders_created_total").increment(1);
                info!(
                    order_id = %receipt.order_id,
                    total_amount = %receipt.total_amount,
                    "Order created"
                );
            }
            Err(e) => {
                counter!("stock_orders_rejected_total", "reason" => e.kind()).increment(1);
                let missing: Decimal = e.shortfalls().iter().map(|s| s.missing()).sum();
                warn!(error = %e, shortfalls = e.shortfalls().len(), %missing, "Order rejected");
            }
        }
        result
    }

    /// 在调用方事务中创建订单
    ///
    /// 所有业务校验（客户、状态、产品、物料需求、库存与金额）都在第一次写入前完成；
    /// 校验失败时不写入任何行。
    #[instrument(skip(self, uow, cmd), fields(actor = %cmd.actor, lines = cmd.lines.len()))]
    pub async fn create_order_in(
        &self,
        uow: &dyn UnitOfWork,
        cmd: CreateOrderCommand,
    ) -> AppResult<OrderReceipt> {
        cmd.validate()?;
        ensure_actor_exists(uow, &cmd.actor).await?;

        let status = uow
            .orders()
            .find_status_by_code(&cmd.status_code)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Order status '{}' not found", cmd.status_code))
            })?;
        let consumption_type = find_stock_type(uow, &self.inventory.consumption_type_code).await?;
        let customer = resolve_customer(uow, cmd.customer).await?;

        // 1. 汇总物料需求
        let mut products: HashMap<ProductId, Product> = HashMap::new();
        let mut requirements = MaterialRequirements::new();
        for line in &cmd.lines {
            if !products.contains_key(&line.product_id) {
                let product = uow
                    .products()
                    .find_by_id(&line.product_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::not_found(format!("Product {} not found", line.product_id))
                    })?;
                products.insert(line.product_id, product);
            }
            let bill_of_materials = products
                .get(&line.product_id)
                .map(|p| p.bill_of_materials.as_slice())
                .unwrap_or_default();
            requirements.add_line(bill_of_materials, &line.material_overrides, line.quantity)?;
        }

        // 2. 锁定物料，在同一事务中读取库存快照并整体校验
        let ledger = StockLedger::new(uow);
        let snapshot = ledger.lock(&requirements.material_ids()).await?;
        let shortfalls = requirements.shortfalls(&snapshot)?;
        if !shortfalls.is_empty() {
            return Err(AppError::insufficient_stock(shortfalls));
        }

        // 3. 订单行金额（溢出属于校验失败，同样在写入前完成）
        let order = Order::open(customer.id, status, cmd.actor);
        let mut order_lines = Vec::with_capacity(cmd.lines.len());
        let mut total_amount = Decimal::ZERO;
        for line in &cmd.lines {
            let order_line = OrderLine::new(
                order.id,
                line.product_id,
                line.quantity,
                line.unit_price,
                line.misc_fee(),
            )?;
            total_amount = total_amount
                .checked_add(order_line.line_total)
                .ok_or_else(|| AppError::validation("Order total overflows"))
                .and_then(|total| ensure_storable_amount("Order total", total))?;
            order_lines.push(order_line);
        }

        // 4. 写入阶段
        if let Some(new_customer) = &customer.pending {
            uow.parties().insert_customer(new_customer).await?;
        }

        uow.orders().insert(&order).await?;
        for order_line in &order_lines {
            uow.orders().insert_line(order_line).await?;
        }

        // 每种物料一张消耗出库单，供应商取物料的供应商
        for (material_id, needed) in requirements.iter() {
            let material = snapshot.get(&material_id).ok_or_else(|| {
                AppError::internal(format!("Material {} missing from snapshot", material_id))
            })?;
            ledger.consume(material, needed).await?;

            let movement = StockMovement::new(
                Direction::Out,
                consumption_type.clone(),
                material.supplier_id,
                cmd.actor,
            )
            .for_order(order.id);
            uow.stock_movements().insert(&movement).await?;
            uow.stock_movements()
                .insert_line(&movement.line(material_id, needed))
                .await?;
        }

        uow.orders().update_total(&order.id, total_amount).await?;

        AuditTrail::record_in(
            uow,
            AuditEntry::new(
                AuditEntity::Order,
                order.id,
                AuditAction::Create,
                AuditDetails::OrderCreated {
                    customer_id: customer.id,
                    status_code: order.status.code.clone(),
                    line_count: cmd.lines.len(),
                    total_amount,
                },
                cmd.actor,
            ),
        )
        .await?;

        Ok(OrderReceipt {
            order_id: order.id,
            total_amount,
        })
    }
}
