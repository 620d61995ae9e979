//! 库存移动记录（手工入库 / 手工出库）

use std::sync::Arc;

use fab_config::InventoryConfig;
use fab_errors::{AppError, AppResult};
use metrics::counter;
use tracing::{info, instrument, warn};

use crate::application::audit_trail::{AuditTrail, ensure_actor_exists};
use crate::application::commands::{MovementReceipt, RecordMovementCommand};
use crate::application::parties::resolve_supplier;
use crate::application::stock_ledger::StockLedger;
use crate::domain::entities::{
    AuditAction, AuditDetails, AuditEntity, AuditEntry, Direction, StockMovement, StockType,
};
use crate::domain::requirements::MaterialRequirements;
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory, complete};

/// 按编码查找库存类型
pub async fn find_stock_type(uow: &dyn UnitOfWork, code: &str) -> AppResult<StockType> {
    uow.stock_movements()
        .find_stock_type_by_code(code)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Stock type '{}' not found", code)))
}

pub struct StockMovementRecorder {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    inventory: InventoryConfig,
}

impl StockMovementRecorder {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, inventory: InventoryConfig) -> Self {
        Self {
            uow_factory,
            inventory,
        }
    }

    /// 记录库存移动（自己拥有事务）
    pub async fn record_movement(&self, cmd: RecordMovementCommand) -> AppResult<MovementReceipt> {
        let direction = cmd.direction;
        let uow = self.uow_factory.begin().await?;
        let result = self.record_movement_in(uow.as_ref(), cmd).await;
        let result = complete(uow, result).await;

        match &result {
            Ok(receipt) => {
                counter!("stock_movements_recorded_total", "direction" => direction.as_str())
                    .increment(1);
                info!(movement_id = %receipt.movement_id, direction = %direction, "Stock movement recorded");
            }
            Err(e) => warn!(direction = %direction, error = %e, "Stock movement rejected"),
        }
        result
    }

    /// 在调用方事务中记录库存移动
    ///
    /// 1. 校验明细与操作人
    /// 2. 解析库存类型（缺省按方向取配置值）与供应商
    /// 3. 锁定涉及的物料；出库时整体校验库存，列出全部缺料
    /// 4. 写入单头、明细，并按明细调整库存
    /// 5. 追加一条审计记录
    #[instrument(skip(self, uow, cmd), fields(direction = %cmd.direction, actor = %cmd.actor))]
    pub async fn record_movement_in(
        &self,
        uow: &dyn UnitOfWork,
        cmd: RecordMovementCommand,
    ) -> AppResult<MovementReceipt> {
        cmd.validate()?;
        ensure_actor_exists(uow, &cmd.actor).await?;

        let type_code = match (&cmd.stock_type_code, cmd.direction) {
            (Some(code), _) => code.as_str(),
            (None, Direction::In) => self.inventory.restock_type_code.as_str(),
            (None, Direction::Out) => self.inventory.consumption_type_code.as_str(),
        };
        let stock_type = find_stock_type(uow, type_code).await?;
        let supplier = resolve_supplier(uow, cmd.supplier).await?;

        let mut totals = MaterialRequirements::new();
        for line in &cmd.lines {
            totals.add(line.material_id, line.quantity)?;
        }
        let ledger = StockLedger::new(uow);
        let snapshot = ledger.lock(&totals.material_ids()).await?;

        if cmd.direction == Direction::Out {
            let shortfalls = totals.shortfalls(&snapshot)?;
            if !shortfalls.is_empty() {
                return Err(AppError::insufficient_stock(shortfalls));
            }
        }

        // 写入阶段
        if let Some(new_supplier) = &supplier.pending {
            uow.parties().insert_supplier(new_supplier).await?;
        }

        let movement = StockMovement::new(cmd.direction, stock_type, Some(supplier.id), cmd.actor);
        uow.stock_movements().insert(&movement).await?;

        let mut audit_lines = Vec::with_capacity(cmd.lines.len());
        for line in &cmd.lines {
            uow.stock_movements()
                .insert_line(&movement.line(line.material_id, line.quantity))
                .await?;
            audit_lines.push((line.material_id, line.quantity));
        }

        for (material_id, quantity) in totals.iter() {
            match cmd.direction {
                Direction::In => {
                    ledger
                        .apply_delta(&material_id, cmd.direction.signed(quantity))
                        .await?
                }
                Direction::Out => {
                    let material = snapshot.get(&material_id).ok_or_else(|| {
                        AppError::internal(format!("Material {} missing from snapshot", material_id))
                    })?;
                    ledger.consume(material, quantity).await?;
                }
            }
        }

        AuditTrail::record_in(
            uow,
            AuditEntry::new(
                AuditEntity::StockMovement,
                movement.id,
                AuditAction::Create,
                AuditDetails::movement(
                    movement.direction,
                    movement.supplier_id,
                    movement.stock_type.code.clone(),
                    &audit_lines,
                    self.inventory.audit_line_limit,
                ),
                cmd.actor,
            ),
        )
        .await?;

        Ok(MovementReceipt {
            movement_id: movement.id,
        })
    }
}
