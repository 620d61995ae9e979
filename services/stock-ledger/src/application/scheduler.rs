//! 定时数据保留清理任务

use std::sync::Arc;
use std::time::Duration;

use fab_config::RetentionSchedule;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::commands::PurgeCommand;
use super::handler::ServiceHandler;
use crate::domain::value_objects::AdminId;

pub struct RetentionTask {
    handler: Arc<ServiceHandler>,
    schedule: RetentionSchedule,
}

impl RetentionTask {
    pub fn new(handler: Arc<ServiceHandler>, schedule: RetentionSchedule) -> Self {
        Self { handler, schedule }
    }

    fn period(&self) -> Duration {
        Duration::from_secs(self.schedule.interval_hours.max(1) * 3600)
    }

    fn command(&self) -> PurgeCommand {
        PurgeCommand {
            years: self.schedule.years,
            admin_id: AdminId::from_uuid(self.schedule.admin_id),
            dry_run: self.schedule.dry_run,
        }
    }

    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                years = self.schedule.years,
                interval_hours = self.schedule.interval_hours,
                dry_run = self.schedule.dry_run,
                "Retention task started"
            );
            let mut ticker = interval(self.period());

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.handler.purge(self.command()).await {
                            error!(error = %e, "Scheduled retention purge failed");
                        }
                    }
                    _ = shutdown.cancelled() => {
                        info!("Retention task received shutdown signal");
                        break;
                    }
                }
            }
            info!("Retention task stopped");
        })
    }
}
