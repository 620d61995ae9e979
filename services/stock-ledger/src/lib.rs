//! stock-ledger - 库存账与订单履约服务

pub mod application;
pub mod domain;
pub mod infrastructure;

/// 数据库迁移（services/stock-ledger/migrations）
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
