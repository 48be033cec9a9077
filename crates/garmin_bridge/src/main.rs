use std::sync::Arc;

use garmin_bridge::config::ServerConfig;
use garmin_bridge::routes::{self, AppState};
use garmin_bridge::{ActivityService, SessionManager, local_clock};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let server_config = ServerConfig::from_env()?;

    // Default to compact, human-friendly output.
    let env_filter = tracing_subscriber::EnvFilter::try_new(&server_config.log_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    info!(log_filter = %server_config.log_filter, "garmin_bridge: log filter");

    let metrics = PrometheusBuilder::new().install_recorder()?;

    let client = garmin_bridge::provider_client(|k| std::env::var(k).ok())?;

    let state = Arc::new(AppState {
        sessions: Arc::new(SessionManager::new(client.clone())),
        activities: Arc::new(ActivityService::new(client, local_clock())),
        metrics,
    });
    let cors = routes::cors_layer(&server_config.cors_origin)?;
    let app = routes::router(state, cors, server_config.max_body_size);

    let addr = server_config.address;
    info!(
        %addr,
        cors_origin = %server_config.cors_origin,
        max_body_bytes = server_config.max_body_size,
        "starting HTTP server"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("failed to install ctrl+c handler: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("garmin_bridge: shut down");
    Ok(())
}
