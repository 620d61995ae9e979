//! 数据保留清理
//!
//! 按截止日期预览（dry run）或永久删除过期的订单与库存移动单。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use fab_errors::{AppError, AppResult};
use metrics::counter;
use tracing::{error, info, instrument};

use crate::application::audit_trail::AuditTrail;
use crate::application::commands::{PurgeCommand, PurgeReport};
use crate::domain::entities::{AuditAction, AuditDetails, AuditEntity, AuditEntry};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory, complete};
use crate::domain::value_objects::ActorIdentity;

/// 保留年限上限；截止日期须落在数据库时间戳范围内
pub const MAX_RETENTION_YEARS: u32 = 1000;

/// now - years * 365 天；超出时间范围时返回 ValidationError
pub fn cutoff_for(now: DateTime<Utc>, years: u32) -> AppResult<DateTime<Utc>> {
    Duration::try_days(365 * i64::from(years))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            AppError::validation(format!("Retention period of {} years is out of range", years))
        })
}

pub struct RetentionPurger {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    /// 允许的最短保留年限
    min_years: u32,
}

impl RetentionPurger {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, min_years: u32) -> Self {
        Self {
            uow_factory,
            min_years,
        }
    }

    /// 执行清理（自己拥有事务）；dry run 结束后总是回滚
    pub async fn purge(&self, cmd: PurgeCommand) -> AppResult<PurgeReport> {
        let uow = self.uow_factory.begin().await?;
        let result = self.purge_in(uow.as_ref(), &cmd).await;

        if cmd.dry_run {
            if let Err(e) = uow.rollback().await {
                error!(error = %e, "Failed to rollback dry-run transaction");
            }
            return result;
        }

        let report = complete(uow, result).await?;
        counter!("stock_retention_purged_rows_total").increment(report.total());
        info!(
            cutoff = %report.cutoff_date,
            order_items = report.order_items,
            orders = report.orders,
            stock_items = report.stock_items,
            stock_movements = report.stock_movements,
            "Retention purge committed"
        );
        Ok(report)
    }

    /// 在调用方事务中清理；dry run 只统计，不写入任何行
    #[instrument(skip(self, uow, cmd), fields(years = cmd.years, dry_run = cmd.dry_run))]
    pub async fn purge_in(&self, uow: &dyn UnitOfWork, cmd: &PurgeCommand) -> AppResult<PurgeReport> {
        if cmd.years < self.min_years {
            return Err(AppError::validation(format!(
                "Retention period must be at least {} years (got {})",
                self.min_years, cmd.years
            )));
        }
        if cmd.years > MAX_RETENTION_YEARS {
            return Err(AppError::validation(format!(
                "Retention period must be at most {} years (got {})",
                MAX_RETENTION_YEARS, cmd.years
            )));
        }
        if !uow.actors().admin_exists(&cmd.admin_id).await? {
            return Err(AppError::not_found(format!("Admin {} not found", cmd.admin_id)));
        }

        let cutoff = cutoff_for(Utc::now(), cmd.years)?;
        let (orders, movements) = if cmd.dry_run {
            (
                uow.orders().count_created_before(cutoff).await?,
                uow.stock_movements().count_created_before(cutoff).await?,
            )
        } else {
            (
                uow.orders().delete_created_before(cutoff).await?,
                uow.stock_movements().delete_created_before(cutoff).await?,
            )
        };

        let report = PurgeReport {
            order_items: orders.lines,
            orders: orders.headers,
            stock_items: movements.lines,
            stock_movements: movements.headers,
            cutoff_date: cutoff,
            dry_run: cmd.dry_run,
        };

        if !cmd.dry_run && report.total() > 0 {
            AuditTrail::record_in(
                uow,
                AuditEntry::new(
                    AuditEntity::Maintenance,
                    "retention",
                    AuditAction::Purge,
                    AuditDetails::RetentionPurged {
                        cutoff,
                        order_items: report.order_items,
                        orders: report.orders,
                        stock_items: report.stock_items,
                        stock_movements: report.stock_movements,
                    },
                    ActorIdentity::Admin(cmd.admin_id),
                ),
            )
            .await?;
        }

        Ok(report)
    }
}
