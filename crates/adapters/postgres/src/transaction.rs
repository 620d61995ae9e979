//! PostgreSQL 事务管理模块

use fab_errors::{AppError, AppResult};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

/// 事务选项
#[derive(Debug, Clone, Default)]
pub struct TransactionOptions {
    /// 语句超时（毫秒），仅作用于当前事务
    pub statement_timeout_ms: Option<u64>,
}

impl TransactionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statement_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.statement_timeout_ms = Some(timeout_ms);
        self
    }

    /// 生成 SET LOCAL 语句；未设置超时时返回 None
    pub fn to_sql(&self) -> Option<String> {
        self.statement_timeout_ms
            .map(|timeout_ms| format!("SET LOCAL statement_timeout = {}", timeout_ms))
    }
}

/// 开始带选项的事务
pub async fn begin_with_options(
    pool: &PgPool,
    options: &TransactionOptions,
) -> AppResult<Transaction<'static, Postgres>> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

    if let Some(sql) = options.to_sql() {
        sqlx::query(&sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to set statement timeout: {}", e)))?;
    }

    debug!(statement_timeout_ms = ?options.statement_timeout_ms, "Transaction started");
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_timeout_sql() {
        assert_eq!(TransactionOptions::new().to_sql(), None);
        assert_eq!(
            TransactionOptions::new().with_statement_timeout_ms(5000).to_sql().as_deref(),
            Some("SET LOCAL statement_timeout = 5000")
        );
    }
}
