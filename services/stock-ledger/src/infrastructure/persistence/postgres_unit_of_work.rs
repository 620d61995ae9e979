//! PostgreSQL Unit of Work 实现

use async_trait::async_trait;
use fab_adapter_postgres::{TransactionOptions, begin_with_options};
use fab_errors::{AppError, AppResult};
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::tx_repositories::{
    SharedTx, TxActorRepository, TxAuditRecordRepository, TxMaterialRepository,
    TxOrderRepository, TxPartyRepository, TxProductRepository, TxStockMovementRepository,
};
use crate::domain::repositories::{
    ActorRepository, AuditRecordRepository, MaterialRepository, OrderRepository, PartyRepository,
    ProductRepository, StockMovementRepository,
};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};

/// Postgres Unit of Work 工厂
pub struct PostgresUnitOfWorkFactory {
    pool: PgPool,
    options: TransactionOptions,
}

impl PostgresUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            options: TransactionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = begin_with_options(&self.pool, &self.options).await?;
        Ok(Box::new(PostgresUnitOfWork::new(tx)))
    }
}

/// Postgres Unit of Work 实现
pub struct PostgresUnitOfWork {
    tx: SharedTx,
    material_repo: TxMaterialRepository,
    product_repo: TxProductRepository,
    order_repo: TxOrderRepository,
    movement_repo: TxStockMovementRepository,
    audit_repo: TxAuditRecordRepository,
    party_repo: TxPartyRepository,
    actor_repo: TxActorRepository,
}

impl PostgresUnitOfWork {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        let tx = Arc::new(Mutex::new(Some(tx)));

        Self {
            tx: tx.clone(),
            material_repo: TxMaterialRepository::new(tx.clone()),
            product_repo: TxProductRepository::new(tx.clone()),
            order_repo: TxOrderRepository::new(tx.clone()),
            movement_repo: TxStockMovementRepository::new(tx.clone()),
            audit_repo: TxAuditRecordRepository::new(tx.clone()),
            party_repo: TxPartyRepository::new(tx.clone()),
            actor_repo: TxActorRepository::new(tx),
        }
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    fn materials(&self) -> &dyn MaterialRepository {
        &self.material_repo
    }

    fn products(&self) -> &dyn ProductRepository {
        &self.product_repo
    }

    fn orders(&self) -> &dyn OrderRepository {
        &self.order_repo
    }

    fn stock_movements(&self) -> &dyn StockMovementRepository {
        &self.movement_repo
    }

    fn audit_records(&self) -> &dyn AuditRecordRepository {
        &self.audit_repo
    }

    fn parties(&self) -> &dyn PartyRepository {
        &self.party_repo
    }

    fn actors(&self) -> &dyn ActorRepository {
        &self.actor_repo
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        tx.rollback()
            .await
            .map_err(|e| AppError::database(format!("Failed to rollback transaction: {}", e)))?;

        Ok(())
    }
}
