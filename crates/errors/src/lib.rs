//! fab-errors - 统一错误处理
//!
//! 基于 RFC 7807 Problem Details 规范

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 库存不足明细（单个物料）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockShortfall {
    pub material_id: Uuid,
    pub material_name: String,
    pub unit: String,
    pub needed: Decimal,
    pub available: Decimal,
}

impl StockShortfall {
    /// 缺口数量
    pub fn missing(&self) -> Decimal {
        self.needed - self.available
    }
}

impl std::fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (need: {} {}, available: {} {})",
            self.material_name, self.needed, self.unit, self.available, self.unit
        )
    }
}

fn format_shortfalls(shortfalls: &[StockShortfall]) -> String {
    shortfalls
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient material stock for: {}", format_shortfalls(.0))]
    InsufficientStock(Vec<StockShortfall>),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn insufficient_stock(shortfalls: Vec<StockShortfall>) -> Self {
        Self::InsufficientStock(shortfalls)
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 库存不足的全部物料（其他错误返回空切片）
    pub fn shortfalls(&self) -> &[StockShortfall] {
        match self {
            Self::InsufficientStock(list) => list,
            _ => &[],
        }
    }

    /// 错误分类标签（用于日志与指标）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::InsufficientStock(_) => "insufficient_stock",
            Self::Duplicate(_) => "duplicate",
            Self::Database(_) => "database",
            Self::Internal(_) => "internal",
        }
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::InsufficientStock(_) => 409,
            Self::Duplicate(_) => 409,
            Self::Database(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// 转换为 Problem Details
    pub fn to_problem_details(&self) -> ProblemDetails {
        let shortfalls = match self {
            Self::InsufficientStock(list) => Some(list.clone()),
            _ => None,
        };

        ProblemDetails {
            r#type: format!("https://api.fab-ledger.dev/problems/{}", self.kind().replace('_', "-")),
            title: self.problem_title().to_string(),
            status: self.status_code(),
            detail: self.to_string(),
            instance: None,
            shortfalls,
        }
    }

    fn problem_title(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::NotFound(_) => "Resource Not Found",
            Self::InsufficientStock(_) => "Insufficient Stock",
            Self::Duplicate(_) => "Duplicate Entry",
            Self::Database(_) => "Database Error",
            Self::Internal(_) => "Internal Server Error",
        }
    }
}

/// RFC 7807 Problem Details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// 扩展成员：库存不足明细
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortfalls: Option<Vec<StockShortfall>>,
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
