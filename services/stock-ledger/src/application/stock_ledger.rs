//! 库存账
//!
//! 只在调用方的事务中读写 current_stock，从不单独提交。

use std::collections::HashMap;

use fab_errors::{AppError, AppResult};
use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::entities::Material;
use crate::domain::unit_of_work::UnitOfWork;
use crate::domain::value_objects::MaterialId;

pub struct StockLedger<'a> {
    uow: &'a dyn UnitOfWork,
}

impl<'a> StockLedger<'a> {
    pub fn new(uow: &'a dyn UnitOfWork) -> Self {
        Self { uow }
    }

    /// 当前库存
    pub async fn get_stock(&self, material_id: &MaterialId) -> AppResult<Decimal> {
        self.uow
            .materials()
            .find_by_id(material_id)
            .await?
            .map(|m| m.current_stock)
            .ok_or_else(|| AppError::not_found(format!("Material {} not found", material_id)))
    }

    /// 库存增减，不做非负校验（由调用方在写入前整体校验）
    pub async fn apply_delta(&self, material_id: &MaterialId, delta: Decimal) -> AppResult<()> {
        self.uow.materials().apply_delta(material_id, delta).await
    }

    /// 锁定物料并取得一致快照；任一物料不存在返回 NotFound
    pub async fn lock(&self, ids: &[MaterialId]) -> AppResult<HashMap<MaterialId, Material>> {
        let snapshot: HashMap<MaterialId, Material> = self
            .uow
            .materials()
            .lock_for_update(ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        if let Some(missing) = ids.iter().find(|id| !snapshot.contains_key(id)) {
            return Err(AppError::not_found(format!("Material {} not found", missing)));
        }
        Ok(snapshot)
    }

    /// 条件扣减；库存已不足时整单失败
    pub async fn consume(&self, material: &Material, quantity: Decimal) -> AppResult<()> {
        let applied = self
            .uow
            .materials()
            .decrement_if_available(&material.id, quantity)
            .await?;
        if applied {
            if material.below_minimum_after(quantity) {
                warn!(
                    material_id = %material.id,
                    material = %material.name,
                    minimum = %material.minimum_stock,
                    "Material stock below minimum"
                );
            }
            return Ok(());
        }

        let available = self.get_stock(&material.id).await?;
        Err(AppError::insufficient_stock(vec![fab_errors::StockShortfall {
            material_id: material.id.0,
            material_name: material.name.clone(),
            unit: material.unit.clone(),
            needed: quantity,
            available,
        }]))
    }
}
