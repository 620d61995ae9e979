//! 产品与物料清单

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{MaterialId, ProductId};

/// 物料清单条目：每生产一件产品所需的物料数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomEntry {
    pub material_id: MaterialId,
    pub used_quantity: Decimal,
    pub unit_cost: Option<Decimal>,
}

/// 产品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub materials_cost: Decimal,
    pub status: String,
    /// 按 position 排序
    pub bill_of_materials: Vec<BomEntry>,
}
