use anyhow::Result;
use health_checker::{
    spawn_scheduler, HealthCheckerConfig, HealthMonitor, InMemoryTargetStore, ReqwestTransport,
};
use healthcheck_server::build_router;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = HealthCheckerConfig::from_env()?;
    config.log_configuration();

    let store = Box::new(InMemoryTargetStore::new());
    let transport = Box::new(ReqwestTransport::new()?);
    let monitor = Arc::new(HealthMonitor::new(store, transport, config));

    spawn_scheduler(monitor.clone(), monitor.get_cycle_interval());

    let app = build_router(monitor);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);

    info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
