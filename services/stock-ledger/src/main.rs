//! stock-ledger Service - 库存账与订单履约

use std::sync::Arc;

use fab_adapter_postgres::{TransactionOptions, check_connection};
use fab_bootstrap::{Infrastructure, run_service};
use fab_errors::AppError;
use tracing::info;

use stock_ledger::MIGRATOR;
use stock_ledger::application::{RetentionTask, ServiceHandler};
use stock_ledger::infrastructure::persistence::PostgresUnitOfWorkFactory;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_service("config", |infra: Infrastructure, shutdown| async move {
        info!("Initializing stock-ledger Service...");

        let pool = infra.postgres_pool();
        check_connection(&pool).await?;

        let config = infra.config();
        if config.database.run_migrations {
            MIGRATOR
                .run(&pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to run migrations: {}", e)))?;
            info!("Database migrations applied");
        }

        let mut uow_factory = PostgresUnitOfWorkFactory::new(pool);
        if let Some(timeout_ms) = config.database.statement_timeout_ms {
            uow_factory = uow_factory
                .with_options(TransactionOptions::new().with_statement_timeout_ms(timeout_ms));
        }
        let uow_factory = Arc::new(uow_factory);
        let handler = Arc::new(ServiceHandler::new(
            uow_factory,
            config.inventory.clone(),
            &config.retention,
        ));

        let mut tasks = Vec::new();
        if let Some(schedule) = config.retention.schedule.clone() {
            let task = Arc::new(RetentionTask::new(handler.clone(), schedule));
            tasks.push(task.start(shutdown.clone()));
        } else {
            info!("Scheduled retention disabled");
        }

        Ok(tasks)
    })
    .await
}
