use energy_summary_api::{create_router, Aggregator, AppState, Config, TibberClient};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real deployments inject the environment directly
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting energy-summary-api");

    let config = match std::env::var("APP_CONFIG") {
        Ok(path) => {
            let config = Config::load(&path)?;
            info!("Configuration loaded from: {}", path);
            config
        }
        Err(_) => {
            let config = Config::from_env()?;
            info!("Configuration loaded from environment");
            config
        }
    };

    let client = TibberClient::from_config(&config.tibber)?;
    info!(
        "Tibber client created: endpoint={}, home_selection={:?}",
        config.tibber.endpoint, config.tibber.home_selection
    );

    let aggregator = Aggregator::new(Arc::new(client), config.tibber.home_selection);
    let state = Arc::new(AppState::new(config.auth.api_key.clone(), aggregator));
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "energy_summary_api=info,tower_http=info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).compact())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
