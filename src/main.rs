use codehaven_collab::collab::GarbageCollector;
use codehaven_collab::config::Config;
use codehaven_collab::db::{CollabStore, MemoryStore, PgStore};
use codehaven_collab::routes::create_app;
use codehaven_collab::AppState;
use std::panic;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

async fn open_store(config: &Config) -> Arc<dyn CollabStore> {
    let Some(db_url) = &config.db_url else {
        warn!("No database URL configured - rooms and files are kept in memory only");
        return Arc::new(MemoryStore::new());
    };

    let store = match PgStore::connect(db_url).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            warn!("Falling back to the in-memory store");
            return Arc::new(MemoryStore::new());
        }
    };
    match store.ensure_schema().await {
        Ok(()) => info!("Database initialized successfully"),
        Err(e) => error!("Failed to verify database schema: {}", e),
    }
    Arc::new(store)
}

#[tokio::main]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Configuration comes first so its log level can seed the filter
    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.default_log_filter().into()))
        .init();

    info!("Starting server...");
    if let Err(e) = &loaded {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
    }
    if config.is_development() {
        info!("Running in development mode as {}", config.cloud_service_name);
    }

    let store = open_store(&config).await;
    let settings = config.collab_settings();

    // Cleanup runs on its own timer, independent of sessions
    let _gc = GarbageCollector::new(store.clone(), &settings).spawn();

    let state = AppState::new(store, settings);
    let app = create_app(state, &config.cors_origin_list());

    let listener = match tokio::net::TcpListener::bind(config.server_address()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", config.server_address(), e);
            return;
        }
    };

    info!("🚀 Server running on http://{}", config.server_address());
    info!("📡 Collaboration socket at ws://{}/collab/<roomId>::<filePath>", config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
