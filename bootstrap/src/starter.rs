//! 服务启动器

use std::future::Future;

use fab_config::AppConfig;
use fab_errors::AppResult;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::infrastructure::Infrastructure;
use crate::runtime::init_runtime;
use crate::shutdown::cancel_on_shutdown;

/// 运行后台服务
///
/// 1. 加载配置
/// 2. 初始化运行时（日志、指标）
/// 3. 创建基础设施资源
/// 4. 调用闭包启动后台任务
/// 5. 等待关闭信号，取消 token 并等待任务退出
pub async fn run_service<F, Fut>(
    config_dir: &str,
    service_builder: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Infrastructure, CancellationToken) -> Fut,
    Fut: Future<Output = AppResult<Vec<JoinHandle<()>>>>,
{
    let config = AppConfig::load(config_dir)?;
    init_runtime(&config)?;

    info!("Starting {} service", config.app_name);

    let infra = Infrastructure::from_config(config).await?;
    let shutdown = CancellationToken::new();

    let tasks = service_builder(infra, shutdown.clone()).await?;
    info!(tasks = tasks.len(), "Service started");

    cancel_on_shutdown(shutdown).await;

    for task in tasks {
        if let Err(e) = task.await {
            error!(error = %e, "Background task ended abnormally");
        }
    }

    info!("Service stopped");
    Ok(())
}
