//! 物料实体

use fab_errors::{AppError, AppResult, StockShortfall};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{MaterialId, SupplierId};

/// 库存数量的小数位数，与 NUMERIC(14, 3) 列一致
pub const QUANTITY_SCALE: u32 = 3;

/// 库存数量上限，与 NUMERIC(14, 3) 列一致
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 3);

/// 数量必须能按库存列原样存储（不超过 3 位小数、不超过上限）
pub fn ensure_storable_quantity(material_id: &MaterialId, quantity: Decimal) -> AppResult<()> {
    if quantity.normalize().scale() > QUANTITY_SCALE {
        return Err(AppError::validation(format!(
            "Quantity {} for material {} has more than {} decimal places",
            quantity, material_id, QUANTITY_SCALE
        )));
    }
    if quantity.abs() > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "Quantity {} for material {} exceeds the maximum of {}",
            quantity, material_id, MAX_QUANTITY
        )));
    }
    Ok(())
}

/// 物料（库存账的最小单位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub minimum_stock: Decimal,
    pub maximum_stock: Decimal,
    pub unit_cost: Decimal,
    pub supplier_id: Option<SupplierId>,
}

impl Material {
    /// 库存是否足够
    pub fn can_supply(&self, needed: Decimal) -> bool {
        self.current_stock >= needed
    }

    /// 需求量超出库存时返回缺口明细
    pub fn shortfall(&self, needed: Decimal) -> Option<StockShortfall> {
        if self.can_supply(needed) {
            return None;
        }
        Some(StockShortfall {
            material_id: self.id.0,
            material_name: self.name.clone(),
            unit: self.unit.clone(),
            needed,
            available: self.current_stock,
        })
    }

    /// 扣减后是否低于最低库存
    pub fn below_minimum_after(&self, consumed: Decimal) -> bool {
        self.current_stock - consumed < self.minimum_stock
    }
}
