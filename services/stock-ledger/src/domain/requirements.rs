//! 物料需求汇总
//!
//! 把订单所有行的 BOM 用量和行级替换用量合并为一张按物料汇总的需求表，
//! 在任何写入之前与库存快照整体比较。

use std::collections::{BTreeMap, HashMap};

use fab_errors::{AppError, AppResult, StockShortfall};
use rust_decimal::Decimal;

use crate::domain::entities::{BomEntry, Material, MaterialOverride, ensure_storable_quantity};
use crate::domain::value_objects::MaterialId;

/// 单行每件产品的物料用量
///
/// 替换项的 original_material_id 命中 BOM 时取代该 BOM 条目，
/// 否则作为额外物料追加。
pub fn per_unit_requirements(
    bill_of_materials: &[BomEntry],
    overrides: &[MaterialOverride],
) -> AppResult<BTreeMap<MaterialId, Decimal>> {
    let mut per_unit: BTreeMap<MaterialId, Decimal> = BTreeMap::new();
    for entry in bill_of_materials {
        *per_unit.entry(entry.material_id).or_default() += entry.used_quantity;
    }

    for item in overrides {
        let material_id = item.resolved_material()?;
        if item.used_quantity < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Material override for {} has a negative quantity",
                material_id
            )));
        }
        ensure_storable_quantity(&material_id, item.used_quantity)?;
        if let Some(original) = item.original_material_id {
            if original != material_id {
                per_unit.remove(&original);
            } else if bill_of_materials.iter().any(|e| e.material_id == original) {
                per_unit.insert(original, Decimal::ZERO);
            }
        }
        *per_unit.entry(material_id).or_default() += item.used_quantity;
    }

    Ok(per_unit)
}

fn overflow(material_id: &MaterialId) -> AppError {
    AppError::validation(format!("Requirement for material {} overflows", material_id))
}

/// 整张订单的物料需求
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialRequirements {
    needed: BTreeMap<MaterialId, Decimal>,
}

impl MaterialRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加一行订单的需求（按行数量放大）
    pub fn add_line(
        &mut self,
        bill_of_materials: &[BomEntry],
        overrides: &[MaterialOverride],
        quantity: i32,
    ) -> AppResult<()> {
        let scale = Decimal::from(quantity);
        for (material_id, used) in per_unit_requirements(bill_of_materials, overrides)? {
            let scaled = used.checked_mul(scale).ok_or_else(|| overflow(&material_id))?;
            self.add(material_id, scaled)?;
        }
        Ok(())
    }

    /// 直接累加某物料的需求量
    pub fn add(&mut self, material_id: MaterialId, quantity: Decimal) -> AppResult<()> {
        let total = self.needed.entry(material_id).or_default();
        *total = total
            .checked_add(quantity)
            .ok_or_else(|| overflow(&material_id))?;
        Ok(())
    }

    /// 需要锁定/校验的物料，按 ID 排序（零用量除外）
    pub fn material_ids(&self) -> Vec<MaterialId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// 非零需求，按物料 ID 排序
    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, Decimal)> + '_ {
        self.needed
            .iter()
            .filter(|(_, qty)| !qty.is_zero())
            .map(|(id, qty)| (*id, *qty))
    }

    pub fn needed(&self, material_id: &MaterialId) -> Decimal {
        self.needed.get(material_id).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// 与库存快照比较，返回全部缺料（不在第一个缺料处停止）
    ///
    /// 快照中缺失的物料视为不存在，返回 NotFound。
    pub fn shortfalls(
        &self,
        snapshot: &HashMap<MaterialId, Material>,
    ) -> AppResult<Vec<StockShortfall>> {
        let mut shortfalls = Vec::new();
        for (material_id, needed) in self.iter() {
            let material = snapshot
                .get(&material_id)
                .ok_or_else(|| AppError::not_found(format!("Material {} not found", material_id)))?;
            if let Some(shortfall) = material.shortfall(needed) {
                shortfalls.push(shortfall);
            }
        }
        Ok(shortfalls)
    }
}
