//! 订单实体

use chrono::{DateTime, Utc};
use fab_errors::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    ActorIdentity, CustomerId, MaterialId, OrderId, OrderLineId, OrderStatusId, ProductId,
};

/// 金额上限，与 NUMERIC(14, 2) 列一致
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// 杂费百分比上限，与 NUMERIC(6, 2) 列一致
pub const MAX_FEE_PERCENT: Decimal = Decimal::from_parts(999_999, 0, 0, false, 2);

/// 金额超出可存储范围时返回 ValidationError
pub fn ensure_storable_amount(what: &str, amount: Decimal) -> AppResult<Decimal> {
    if amount.abs() > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{} {} exceeds the maximum of {}",
            what, amount, MAX_AMOUNT
        )));
    }
    Ok(amount)
}

/// 订单状态（字典表）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub id: OrderStatusId,
    pub code: String,
}

/// 订单头
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    /// 由订单行汇总得出，不接受调用方传入
    pub total_amount: Decimal,
    pub actor: ActorIdentity,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// 新订单头，金额先占位为 0，订单行写入后回填
    pub fn open(customer_id: CustomerId, status: OrderStatus, actor: ActorIdentity) -> Self {
        Self {
            id: OrderId::new(),
            customer_id,
            status,
            total_amount: Decimal::ZERO,
            actor,
            created_at: Utc::now(),
        }
    }
}

/// 订单行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub misc_fee_percent: Decimal,
    pub line_total: Decimal,
}

impl OrderLine {
    pub fn new(
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        unit_price: Decimal,
        misc_fee_percent: Decimal,
    ) -> AppResult<Self> {
        Ok(Self {
            id: OrderLineId::new(),
            order_id,
            product_id,
            quantity,
            unit_price,
            misc_fee_percent,
            line_total: line_total(quantity, unit_price, misc_fee_percent)?,
        })
    }
}

/// quantity * unit_price * (1 + misc_fee_percent / 100)，保留两位小数
///
/// 溢出或超出金额列范围时返回 ValidationError。
pub fn line_total(
    quantity: i32,
    unit_price: Decimal,
    misc_fee_percent: Decimal,
) -> AppResult<Decimal> {
    let overflow = || AppError::validation("Order line total overflows");
    let fee_factor = Decimal::ONE
        .checked_add(misc_fee_percent / Decimal::ONE_HUNDRED)
        .ok_or_else(overflow)?;
    let total = Decimal::from(quantity)
        .checked_mul(unit_price)
        .and_then(|amount| amount.checked_mul(fee_factor))
        .ok_or_else(overflow)?;
    ensure_storable_amount("Order line total", total.round_dp(2))
}

/// 订单行级物料替换（如按尺寸切割的玻璃）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialOverride {
    /// 被替换的 BOM 物料
    pub original_material_id: Option<MaterialId>,
    /// 实际选用的物料
    pub selected_material_id: Option<MaterialId>,
    /// 每件产品的用量
    pub used_quantity: Decimal,
}

impl MaterialOverride {
    /// 实际消耗的物料：优先取选用物料，否则取原物料
    pub fn resolved_material(&self) -> AppResult<MaterialId> {
        self.selected_material_id
            .or(self.original_material_id)
            .ok_or_else(|| {
                AppError::validation("Material override has no resolvable material id")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_total_applies_misc_fee() {
        assert_eq!(line_total(3, dec!(1500), dec!(10)).unwrap(), dec!(4950.00));
        assert_eq!(line_total(2, dec!(99.99), Decimal::ZERO).unwrap(), dec!(199.98));
    }

    #[test]
    fn test_line_total_rounds_to_cents() {
        assert_eq!(line_total(1, dec!(10), dec!(3.333)).unwrap(), dec!(10.33));
    }

    #[test]
    fn test_line_total_overflow_is_a_validation_error() {
        assert_eq!(MAX_AMOUNT, dec!(999999999999.99));
        assert!(matches!(
            line_total(2, Decimal::MAX, Decimal::ZERO),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            line_total(1, dec!(1), Decimal::MAX),
            Err(AppError::Validation(_))
        ));
        // 不溢出 Decimal 但超出金额列
        assert!(matches!(
            line_total(1000, MAX_AMOUNT, Decimal::ZERO),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_override_prefers_selected_material() {
        let original = MaterialId::new();
        let selected = MaterialId::new();
        let substitute = MaterialOverride {
            original_material_id: Some(original),
            selected_material_id: Some(selected),
            used_quantity: dec!(2),
        };
        assert_eq!(substitute.resolved_material().unwrap(), selected);

        let plain = MaterialOverride {
            selected_material_id: None,
            ..substitute.clone()
        };
        assert_eq!(plain.resolved_material().unwrap(), original);

        let empty = MaterialOverride {
            original_material_id: None,
            selected_material_id: None,
            used_quantity: dec!(1),
        };
        assert!(matches!(
            empty.resolved_material(),
            Err(AppError::Validation(_))
        ));
    }
}
