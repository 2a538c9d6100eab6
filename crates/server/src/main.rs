use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunegrab_core::{
    load_config, load_config_from_env, validate_config, ConversionPipeline, ConversionService,
    FfmpegTranscoder, ProgressStore, Resolver, StagingArea, Transcoder, YtDlpResolver,
};
use tunegrab_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("tunegrab {}", VERSION);

    // Determine config path
    let config_path = std::env::var("TUNEGRAB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}, using defaults", config_path);
        load_config_from_env().context("Failed to load config from environment")?
    };

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    // Prepare staging directory
    let staging = StagingArea::new(&config.staging);
    staging
        .prepare()
        .await
        .with_context(|| format!("Failed to create staging directory {:?}", staging.root()))?;
    info!("Staging files under {:?}", staging.root());

    // Create resolver
    let resolver: Arc<dyn Resolver> = Arc::new(
        YtDlpResolver::new(config.resolver.clone()).context("Failed to create resolver")?,
    );
    if let Err(e) = resolver.validate().await {
        warn!("Resolver not ready, conversions will fail: {}", e);
    } else {
        info!("Using resolver: {}", resolver.name());
    }

    // Create transcoder
    let transcoder: Arc<dyn Transcoder> =
        Arc::new(FfmpegTranscoder::new(config.transcoder.clone()));
    if let Err(e) = transcoder.validate().await {
        warn!("Transcoder not ready, conversions will fail: {}", e);
    } else {
        info!("Using transcoder: {}", transcoder.name());
    }

    // Create conversion service
    let pipeline = ConversionPipeline::new(resolver, transcoder, staging);
    let service = Arc::new(ConversionService::new(
        pipeline,
        Arc::new(ProgressStore::new()),
    ));

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), service));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
