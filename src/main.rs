use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upbox::{config::Config, storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upbox=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Upload config must be fully resolved before the listener binds
    storage::prepare(&config.upload).await?;

    tracing::info!(
        "Upload config: max {} KB, allowed types {:?}, storage {} ({})",
        config.upload.max_file_size_kb(),
        config.upload.allowed_categories(),
        config.upload.storage_mode(),
        config.upload.upload_dir().display()
    );

    let port = config.port;
    let app = upbox::app(config.upload);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("upbox listening on {}", addr);
    tracing::info!("API docs available at http://{}/docs", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
