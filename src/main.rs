use anyhow::Context;

use todo_api::app::{build_router, build_store};
use todo_api::config::{ServerConfig, StorageKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().context("loading configuration")?;

    eprintln!("📝 Todo API v{}", env!("CARGO_PKG_VERSION"));
    match config.storage {
        StorageKind::File => eprintln!("   Storage: {}", config.data_path.display()),
        StorageKind::Memory => eprintln!("   Storage: in-memory"),
    }
    eprintln!("   Static: {}", config.static_dir.display());
    eprintln!("   REST: http://{}/api/todos", config.bind_addr());
    eprintln!("   Feed: ws://{}/ws/todos\n", config.bind_addr());

    let store = build_store(&config);
    let app = build_router(store, &config).context("building router")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;
    tracing::info!(addr = %config.bind_addr(), "Todo API server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("Todo API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
