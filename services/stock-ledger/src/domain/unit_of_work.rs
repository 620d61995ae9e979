//! Unit of Work 模式
//!
//! 一次业务操作的全部写入（含审计记录）在同一个事务中提交或回滚。
//!
//! 所有权规则：
//! - 接收 `&dyn UnitOfWork` 的函数（`*_in` 形式）只读写，绝不提交或回滚；
//! - 通过 `UnitOfWorkFactory::begin` 自己开启事务的函数负责 commit/rollback。

use async_trait::async_trait;
use fab_errors::AppResult;
use tracing::error;

use crate::domain::repositories::{
    ActorRepository, AuditRecordRepository, MaterialRepository, OrderRepository, PartyRepository,
    ProductRepository, StockMovementRepository,
};

/// Unit of Work trait
///
/// # 使用示例
///
/// ```ignore
/// let uow = uow_factory.begin().await?;
/// let result = recorder.record_movement_in(uow.as_ref(), cmd).await;
/// complete(uow, result).await
/// ```
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn materials(&self) -> &dyn MaterialRepository;

    fn products(&self) -> &dyn ProductRepository;

    fn orders(&self) -> &dyn OrderRepository;

    fn stock_movements(&self) -> &dyn StockMovementRepository;

    fn audit_records(&self) -> &dyn AuditRecordRepository;

    fn parties(&self) -> &dyn PartyRepository;

    fn actors(&self) -> &dyn ActorRepository;

    /// 提交事务
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// 回滚事务
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Unit of Work 工厂 trait
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开始新的事务
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}

/// 结束自己拥有的事务：成功则提交，失败则回滚并返回原始错误
///
/// 回滚失败只记录日志，不覆盖原始错误。
pub async fn complete<T>(uow: Box<dyn UnitOfWork>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = uow.rollback().await {
                error!(error = %rollback_err, original = %e, "Failed to rollback transaction");
            }
            Err(e)
        }
    }
}
