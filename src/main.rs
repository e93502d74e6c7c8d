use anyhow::Context;
use stashkeeper::orchestration::Ticker;
use stashkeeper::{api, config::Config, db::init_db, Repository};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = Config::from_env().context("failed to load configuration")?;
    let port = config.port;

    // Initialize database and dependencies
    let pool = init_db(&config.database_path)
        .await
        .context("failed to initialize database")?;
    let repo = Arc::new(Repository::new(pool));

    // 1 Hz clock driving all derived run phases.
    let ticker = Ticker::start(Duration::from_secs(1));

    // Create router
    let app = api::create_router(api::AppState::new(repo, config, ticker.subscribe()));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    // Run server
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
