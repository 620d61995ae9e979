//! 数据库错误映射
//!
//! 约束违规按 PostgreSQL 错误码区分；库存与操作人约束给出业务化的消息。

use fab_errors::AppError;

/// 将 SQLx 错误转换为 AppError，区分不同错误类型
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                match code.as_ref() {
                    // PostgreSQL 约束违规代码
                    "23505" => AppError::duplicate(format!(
                        "Duplicate entry violates unique constraint{}",
                        db_err
                            .constraint()
                            .map(|c| format!(" {}", c))
                            .unwrap_or_default()
                    )),
                    "23503" => AppError::validation("Foreign key constraint violation"),
                    "23514" => match db_err.constraint() {
                        Some("materials_current_stock_check") => {
                            AppError::validation("Material stock cannot go negative")
                        }
                        Some(c) if c.ends_with("_single_actor") => AppError::validation(
                            "Exactly one of admin_id or employee_id must be set",
                        ),
                        other => AppError::validation(format!(
                            "Check constraint violation{}",
                            other.map(|c| format!(" {}", c)).unwrap_or_default()
                        )),
                    },
                    "23502" => AppError::validation("Not null constraint violation"),
                    "22001" => AppError::validation("String data too long"),
                    "22P02" => AppError::validation("Invalid input syntax"),
                    _ => AppError::database(format!("Database error ({}): {}", code, db_err)),
                }
            } else {
                AppError::database(db_err.to_string())
            }
        }
        sqlx::Error::PoolTimedOut => AppError::internal("Database connection pool timeout"),
        sqlx::Error::PoolClosed => AppError::internal("Database connection pool is closed"),
        sqlx::Error::Protocol(msg) => AppError::internal(format!("Database protocol error: {}", msg)),
        _ => AppError::database(e.to_string()),
    }
}

/// 将 serde_json 错误转换为 AppError
pub fn map_json_error(e: serde_json::Error) -> AppError {
    AppError::internal(format!("JSON serialization error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_pool_errors_are_internal() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            AppError::Internal(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_other_errors_are_database() {
        let err = map_sqlx_error(sqlx::Error::ColumnNotFound("current_stock".to_string()));
        assert!(matches!(err, AppError::Database(_)));
    }
}
