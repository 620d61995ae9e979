//! fab-config - 配置加载库
//!
//! 加载顺序：`default.toml` → `<APP_ENV>.toml` → `APP_` 前缀环境变量（`__` 分隔层级）

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Load(Box::new(e))
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 启动时执行 migrations
    #[serde(default = "default_true")]
    pub run_migrations: bool,
    /// 单个事务内的语句超时（毫秒），不设置则沿用数据库默认值
    #[serde(default)]
    pub statement_timeout_ms: Option<u64>,
}

fn default_max_connections() -> u32 {
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

fn default_true() -> bool {
    true
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub metrics_enabled: bool,
    /// Prometheus 抓取端口
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_port() -> u16 {
    9100
}

/// 库存业务配置
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    /// 手工入库默认库存类型编码
    #[serde(default = "default_restock_type_code")]
    pub restock_type_code: String,
    /// 订单自动出库库存类型编码
    #[serde(default = "default_consumption_type_code")]
    pub consumption_type_code: String,
    /// 审计明细中最多记录的行数
    #[serde(default = "default_audit_line_limit")]
    pub audit_line_limit: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            restock_type_code: default_restock_type_code(),
            consumption_type_code: default_consumption_type_code(),
            audit_line_limit: default_audit_line_limit(),
        }
    }
}

fn default_restock_type_code() -> String {
    "STT001".to_string()
}

fn default_consumption_type_code() -> String {
    "STT002".to_string()
}

fn default_audit_line_limit() -> usize {
    20
}

/// 数据保留策略
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// 允许的最短保留年限（低于此值的清理请求被拒绝）
    #[serde(default = "default_min_years")]
    pub min_years: u32,
    /// 定时清理（未配置则不启用）
    #[serde(default)]
    pub schedule: Option<RetentionSchedule>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            min_years: default_min_years(),
            schedule: None,
        }
    }
}

fn default_min_years() -> u32 {
    2
}

/// 定时清理任务
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionSchedule {
    /// 以该管理员身份执行清理
    pub admin_id: Uuid,
    pub years: u32,
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_interval_hours() -> u64 {
    24
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Serialized::default("app_env", &env))
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.retention.min_years == 0 {
            return Err(ConfigError::Invalid(
                "retention.min_years must be at least 1".to_string(),
            ));
        }
        if let Some(schedule) = &self.retention.schedule {
            if schedule.years < self.retention.min_years {
                return Err(ConfigError::Invalid(format!(
                    "retention.schedule.years ({}) is below retention.min_years ({})",
                    schedule.years, self.retention.min_years
                )));
            }
            if schedule.interval_hours == 0 {
                return Err(ConfigError::Invalid(
                    "retention.schedule.interval_hours must be positive".to_string(),
                ));
            }
        }
        if self.inventory.audit_line_limit == 0 {
            return Err(ConfigError::Invalid(
                "inventory.audit_line_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

#[cfg(test)]
mod tests;
