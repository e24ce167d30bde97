use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recents_api::{
    app::build_router,
    config::{Config, StorageBackend},
    state::AppState,
};
use recents_persist::{
    InMemorySummaryCache, MemoryMessageFeed, MemoryProfileDirectory, MemorySummaryStore, MongoBackend,
    MongoSettings,
};
use recents_sync::{RecentsService, RecentsServiceBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting recents API server");
    tracing::info!("Config loaded: {}:{} ({})", config.server.host, config.server.port, config.environment);

    let cache = Arc::new(InMemorySummaryCache::new());
    spawn_cache_cleanup(Arc::clone(&cache), config.sync_config().cache_ttl);

    let builder = RecentsService::builder()
        .cache(cache)
        .config(config.sync_config());
    let service = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            with_memory_backend(builder).build()?
        }
        StorageBackend::Mongodb => {
            tracing::info!("Connecting to MongoDB");
            let backend = MongoBackend::connect(&MongoSettings {
                uri: config.mongodb_uri.clone(),
                database: config.storage.database.clone(),
                pool_size: config.storage.pool_size,
                timeout: config.storage_timeout(),
            })
            .await?;

            // The driver connects lazily; an unreachable server shows up in
            // /health instead of blocking startup.
            if let Err(e) = backend.ensure_indexes().await {
                tracing::warn!("Failed to ensure MongoDB indexes: {}", e);
            }

            builder
                .feed(Arc::new(backend.message_feed()))
                .store(Arc::new(backend.summary_store()))
                .profiles(Arc::new(backend.profile_directory()))
                .build()?
        }
    };

    let state = Arc::new(AppState::new(config.clone(), service));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn with_memory_backend(builder: RecentsServiceBuilder) -> RecentsServiceBuilder {
    builder
        .feed(Arc::new(MemoryMessageFeed::new()))
        .store(Arc::new(MemorySummaryStore::new()))
        .profiles(Arc::new(MemoryProfileDirectory::new()))
}

/// Expired entries are also dropped on read; this only bounds memory held by
/// owners who never come back.
fn spawn_cache_cleanup(cache: Arc<InMemorySummaryCache>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            match cache.cleanup_expired() {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "Dropped expired cache entries"),
                Err(e) => tracing::warn!("Cache cleanup failed: {}", e),
            }
        }
    });
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
