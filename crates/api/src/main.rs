use anyhow::{Context, Result};
use tracing::info;

use course_insights_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;

    info!("Starting Course Insights v{}", env!("CARGO_PKG_VERSION"));

    middleware::init_metrics().context("Failed to initialize metrics")?;

    let addr = config
        .socket_addr()
        .context("Invalid server.host / server.port")?;

    let state = app::AppState::from_config(config)?;
    info!(
        analytics_api = %state.config.analytics_api.base_url,
        allowed_courses = state.config.courses.allowed.len(),
        "Services configured"
    );

    let app = app::create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
