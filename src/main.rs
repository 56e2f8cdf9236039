use std::net::SocketAddr;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flashcards_server::{AppState, Config, Store, open_database, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashcards_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Flashcards Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}, Frontend origin: {}",
        config.environment,
        config.server_address(),
        config.frontend_origin
    );

    // Open database and create tables
    let db = open_database(&config.database_path)?;
    tracing::info!("Database opened at {}", config.database_path);

    let store = Store::open(db);

    // Sessions expire lazily; drop the ones that lapsed while we were down
    let purge_store = store.clone();
    let purged =
        tokio::task::spawn_blocking(move || purge_store.sessions.purge_expired()).await??;
    tracing::info!("Purged {} expired sessions", purged);

    let log_requests = config.log_requests;
    let addr: SocketAddr = config.server_address().parse()?;

    let mut app = router(AppState::new(store, config))?;
    if log_requests {
        app = app.layer(TraceLayer::new_for_http());
    }

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
