//! 命令与返回结果

use chrono::{DateTime, Utc};
use fab_errors::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    Direction, MAX_AMOUNT, MAX_FEE_PERCENT, MaterialOverride, NewCustomer, NewSupplier,
    ensure_storable_quantity,
};
use crate::domain::value_objects::{
    ActorIdentity, AdminId, CustomerId, MaterialId, MovementId, OrderId, ProductId, SupplierId,
};

/// 供应商：已有 ID 或新建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierRef {
    Existing(SupplierId),
    New(NewSupplier),
}

/// 客户：已有 ID 或新建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerRef {
    Existing(CustomerId),
    New(NewCustomer),
}

/// 库存移动明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementLineInput {
    pub material_id: MaterialId,
    pub quantity: Decimal,
}

/// 记录库存移动命令
#[derive(Debug, Clone)]
pub struct RecordMovementCommand {
    pub direction: Direction,
    /// 未提供时返回 ValidationError
    pub supplier: Option<SupplierRef>,
    /// 库存类型编码，未提供时按方向取配置的默认值
    pub stock_type_code: Option<String>,
    pub actor: ActorIdentity,
    pub lines: Vec<MovementLineInput>,
}

impl RecordMovementCommand {
    pub fn validate(&self) -> AppResult<()> {
        if self.lines.is_empty() {
            return Err(AppError::validation("Stock movement requires at least one line"));
        }
        for line in &self.lines {
            if line.quantity <= Decimal::ZERO {
                return Err(AppError::validation(format!(
                    "Quantity for material {} must be positive",
                    line.material_id
                )));
            }
            ensure_storable_quantity(&line.material_id, line.quantity)?;
        }
        Ok(())
    }
}

/// 订单行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// 杂费百分比，缺省为 0
    #[serde(default)]
    pub misc_fee_percent: Option<Decimal>,
    #[serde(default)]
    pub material_overrides: Vec<MaterialOverride>,
}

impl OrderLineInput {
    pub fn misc_fee(&self) -> Decimal {
        self.misc_fee_percent.unwrap_or(Decimal::ZERO)
    }
}

/// 创建订单命令
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub customer: Option<CustomerRef>,
    pub status_code: String,
    pub actor: ActorIdentity,
    pub lines: Vec<OrderLineInput>,
}

impl CreateOrderCommand {
    pub fn validate(&self) -> AppResult<()> {
        if self.customer.is_none() {
            return Err(AppError::validation(
                "Order requires an existing customer id or new customer details",
            ));
        }
        if self.status_code.trim().is_empty() {
            return Err(AppError::validation("Order status code is required"));
        }
        if self.lines.is_empty() {
            return Err(AppError::validation("Order requires at least one line"));
        }
        for line in &self.lines {
            if line.quantity <= 0 {
                return Err(AppError::validation(format!(
                    "Quantity for product {} must be positive",
                    line.product_id
                )));
            }
            if line.unit_price < Decimal::ZERO {
                return Err(AppError::validation(format!(
                    "Unit price for product {} cannot be negative",
                    line.product_id
                )));
            }
            if line.misc_fee() < Decimal::ZERO {
                return Err(AppError::validation(format!(
                    "Misc fee for product {} cannot be negative",
                    line.product_id
                )));
            }
            if line.unit_price > MAX_AMOUNT {
                return Err(AppError::validation(format!(
                    "Unit price for product {} exceeds the maximum of {}",
                    line.product_id, MAX_AMOUNT
                )));
            }
            if line.misc_fee() > MAX_FEE_PERCENT {
                return Err(AppError::validation(format!(
                    "Misc fee for product {} exceeds the maximum of {}%",
                    line.product_id, MAX_FEE_PERCENT
                )));
            }
        }
        Ok(())
    }
}

/// 更新订单状态命令
#[derive(Debug, Clone)]
pub struct UpdateOrderStatusCommand {
    pub order_id: OrderId,
    pub status_code: String,
    pub actor: ActorIdentity,
}

/// 删除订单命令
#[derive(Debug, Clone)]
pub struct DeleteOrderCommand {
    pub order_id: OrderId,
    pub actor: ActorIdentity,
}

/// 数据保留清理命令
#[derive(Debug, Clone)]
pub struct PurgeCommand {
    pub years: u32,
    pub admin_id: AdminId,
    pub dry_run: bool,
}

/// 创建订单结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub total_amount: Decimal,
}

/// 库存移动结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementReceipt {
    pub movement_id: MovementId,
}

/// 数据保留清理结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurgeReport {
    pub order_items: u64,
    pub orders: u64,
    pub stock_items: u64,
    pub stock_movements: u64,
    pub cutoff_date: DateTime<Utc>,
    pub dry_run: bool,
}

impl PurgeReport {
    pub fn total(&self) -> u64 {
        self.order_items + self.orders + self.stock_items + self.stock_movements
    }
}
