//! Resize Proxy - fetches remote JPEG images and serves them resized.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resize_proxy::{
    config::Config,
    resize::{ResizeCache, ResizeService},
    server::{create_router, RouterConfig, SERVICE_NAME},
    source::HttpImageSource,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("{} v{}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Cache: {}MB, TTL {}s", config.cache_size / (1024 * 1024), config.cache_ttl);
    info!(
        "  Source fetch: timeout {}s, max {}MB",
        config.fetch_timeout,
        config.max_source_size / (1024 * 1024)
    );
    info!(
        "  Parameters: url, {}, {}",
        config.width_param, config.height_param
    );

    let source = match HttpImageSource::with_limits(config.fetch_timeout(), config.max_source_size)
    {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // The service owns the server-side cache; the router shares it across requests
    let service = ResizeService::with_cache(source, ResizeCache::with_capacity(config.cache_size))
        .with_cache_ttl(config.cache_ttl());

    let router = create_router(service, build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!(
        "  curl 'http://{}/resize?url=<image-url>&{}=100&{}=0'",
        addr, config.width_param, config.height_param
    );

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "resize_proxy=debug,tower_http=debug"
    } else {
        "resize_proxy=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_tracing(!config.no_tracing)
        .with_param_names(config.param_names());

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
