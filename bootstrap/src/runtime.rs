//! 服务运行时

use std::net::SocketAddr;

use fab_config::AppConfig;
use fab_telemetry::{TelemetryError, init_metrics, init_tracing, init_tracing_json};
use tracing::info;

/// 初始化服务运行时（日志、指标）
pub fn init_runtime(config: &AppConfig) -> Result<(), TelemetryError> {
    if config.is_production() || config.telemetry.json {
        init_tracing_json(&config.telemetry.log_level)?;
    } else {
        init_tracing(&config.telemetry.log_level)?;
    }

    if config.telemetry.metrics_enabled {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.telemetry.metrics_port));
        init_metrics(addr)?;
        info!(%addr, "Prometheus exporter listening");
    }

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        metrics = config.telemetry.metrics_enabled,
        "Runtime initialized"
    );
    Ok(())
}
