//! 审计记录
//!
//! 只追加，不更新；仅在数据保留清理时随业务记录一起删除。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::entities::Direction;
use crate::domain::value_objects::{ActorIdentity, AuditRecordId, CustomerId, MaterialId, SupplierId};

/// 审计对象类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntity {
    Order,
    StockMovement,
    Maintenance,
}

impl AuditEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::StockMovement => "stock_movement",
            Self::Maintenance => "maintenance",
        }
    }
}

impl FromStr for AuditEntity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(Self::Order),
            "stock_movement" => Ok(Self::StockMovement),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(format!("Unknown audit entity: {}", other)),
        }
    }
}

/// 审计动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    UpdateStatus,
    Delete,
    Purge,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::UpdateStatus => "update_status",
            Self::Delete => "delete",
            Self::Purge => "purge",
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update_status" => Ok(Self::UpdateStatus),
            "delete" => Ok(Self::Delete),
            "purge" => Ok(Self::Purge),
            other => Err(format!("Unknown audit action: {}", other)),
        }
    }
}

/// 移动明细摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLine {
    pub material_id: MaterialId,
    pub quantity: Decimal,
}

/// 结构化审计明细（以 JSONB 存储）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditDetails {
    MovementRecorded {
        direction: Direction,
        supplier_id: Option<SupplierId>,
        stock_type: String,
        line_count: usize,
        lines: Vec<AuditLine>,
        truncated: bool,
    },
    OrderCreated {
        customer_id: CustomerId,
        status_code: String,
        line_count: usize,
        total_amount: Decimal,
    },
    OrderStatusChanged {
        from: String,
        to: String,
    },
    OrderDeleted {
        line_count: u64,
    },
    RetentionPurged {
        cutoff: DateTime<Utc>,
        order_items: u64,
        orders: u64,
        stock_items: u64,
        stock_movements: u64,
    },
    Note {
        message: String,
    },
}

impl AuditDetails {
    /// 移动单摘要，明细超过 limit 行时截断
    pub fn movement(
        direction: Direction,
        supplier_id: Option<SupplierId>,
        stock_type: impl Into<String>,
        lines: &[(MaterialId, Decimal)],
        limit: usize,
    ) -> Self {
        Self::MovementRecorded {
            direction,
            supplier_id,
            stock_type: stock_type.into(),
            line_count: lines.len(),
            lines: lines
                .iter()
                .take(limit)
                .map(|(material_id, quantity)| AuditLine {
                    material_id: *material_id,
                    quantity: *quantity,
                })
                .collect(),
            truncated: lines.len() > limit,
        }
    }
}

/// 一条待写入的审计记录
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub entity: AuditEntity,
    pub entity_id: String,
    pub action: AuditAction,
    pub details: AuditDetails,
    pub actor: ActorIdentity,
}

impl AuditEntry {
    pub fn new(
        entity: AuditEntity,
        entity_id: impl ToString,
        action: AuditAction,
        details: AuditDetails,
        actor: ActorIdentity,
    ) -> Self {
        Self {
            entity,
            entity_id: entity_id.to_string(),
            action,
            details,
            actor,
        }
    }
}

/// 已持久化的审计记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: AuditRecordId,
    pub entity: AuditEntity,
    pub entity_id: String,
    pub action: AuditAction,
    pub details: AuditDetails,
    pub actor: ActorIdentity,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn from_entry(entry: AuditEntry) -> Self {
        Self {
            id: AuditRecordId::new(),
            entity: entry.entity,
            entity_id: entry.entity_id,
            action: entry.action,
            details: entry.details,
            actor: entry.actor,
            created_at: Utc::now(),
        }
    }
}
