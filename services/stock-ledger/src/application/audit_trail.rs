//! 审计记录写入
//!
//! 审计记录与它描述的业务变更在同一事务中写入；回滚会一并抹掉审计行。

use std::sync::Arc;

use fab_errors::{AppError, AppResult};
use tracing::{debug, instrument};

use crate::domain::entities::{AuditEntry, AuditRecord};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory, complete};
use crate::domain::value_objects::ActorIdentity;

/// 校验操作人在对应表中存在
pub async fn ensure_actor_exists(uow: &dyn UnitOfWork, actor: &ActorIdentity) -> AppResult<()> {
    let exists = match actor {
        ActorIdentity::Admin(id) => uow.actors().admin_exists(id).await?,
        ActorIdentity::Employee(id) => uow.actors().employee_exists(id).await?,
    };
    if !exists {
        return Err(AppError::not_found(format!("Actor {} not found", actor)));
    }
    Ok(())
}

pub struct AuditTrail {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl AuditTrail {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 在调用方的事务中追加一条审计记录（不提交、不回滚）
    #[instrument(skip(uow, entry), fields(entity = entry.entity.as_str(), action = entry.action.as_str()))]
    pub async fn record_in(uow: &dyn UnitOfWork, entry: AuditEntry) -> AppResult<AuditRecord> {
        ensure_actor_exists(uow, &entry.actor).await?;

        let record = AuditRecord::from_entry(entry);
        uow.audit_records().append(&record).await?;

        debug!(
            audit_id = %record.id,
            entity_id = %record.entity_id,
            actor = %record.actor,
            role = record.actor.role(),
            "Audit record appended"
        );
        Ok(record)
    }

    /// 独立写入：自己开启、提交并关闭一个短事务
    pub async fn record(&self, entry: AuditEntry) -> AppResult<AuditRecord> {
        let uow = self.uow_factory.begin().await?;
        let result = Self::record_in(uow.as_ref(), entry).await;
        complete(uow, result).await
    }
}
