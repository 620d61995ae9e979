//! 库存移动单

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::value_objects::{
    ActorIdentity, MaterialId, MovementId, MovementLineId, OrderId, StockTypeId, SupplierId,
};

/// 移动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }

    /// 账面数量变化（入库为正，出库为负）
    pub fn signed(&self, quantity: Decimal) -> Decimal {
        match self {
            Self::In => quantity,
            Self::Out => -quantity,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(format!("Unknown stock direction: {}", other)),
        }
    }
}

/// 库存类型（字典表，如 STT001 入库、STT002 订单消耗）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockType {
    pub id: StockTypeId,
    pub code: String,
}

/// 库存移动单头
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub direction: Direction,
    pub stock_type: StockType,
    pub supplier_id: Option<SupplierId>,
    /// 订单自动出库时关联的订单
    pub order_id: Option<OrderId>,
    pub actor: ActorIdentity,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn new(
        direction: Direction,
        stock_type: StockType,
        supplier_id: Option<SupplierId>,
        actor: ActorIdentity,
    ) -> Self {
        Self {
            id: MovementId::new(),
            direction,
            stock_type,
            supplier_id,
            order_id: None,
            actor,
            created_at: Utc::now(),
        }
    }

    pub fn for_order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn line(&self, material_id: MaterialId, quantity: Decimal) -> MovementLine {
        MovementLine {
            id: MovementLineId::new(),
            movement_id: self.id,
            material_id,
            quantity,
        }
    }
}

/// 库存移动明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementLine {
    pub id: MovementLineId,
    pub movement_id: MovementId,
    pub material_id: MaterialId,
    pub quantity: Decimal,
}
