use library_lending::{
    adapters::{
        memory::InMemoryStore,
        postgres::{self, PostgresBookCatalog, PostgresLendingLedger, PostgresUserRoster},
    },
    api::{handlers::AppState, router::create_router},
    application::lending::ServiceDependencies,
    config::{Config, StorageBackend},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_lending=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    // Initialize adapters
    let service_deps = match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            let store = Arc::new(InMemoryStore::new());
            ServiceDependencies {
                books: store.clone(),
                users: store.clone(),
                ledger: store,
            }
        }
        StorageBackend::Postgres => {
            tracing::info!(
                max_connections = config.database_max_connections,
                "Connecting to database"
            );

            // Initialize database connection pool
            let pool = postgres::connect(
                &config.database_url,
                config.database_max_connections,
                config.database_acquire_timeout,
            )
            .await
            .expect("Failed to connect to database");

            postgres::run_migrations(&pool)
                .await
                .expect("Failed to run migrations");

            ServiceDependencies {
                books: Arc::new(PostgresBookCatalog::new(pool.clone())),
                users: Arc::new(PostgresUserRoster::new(pool.clone())),
                ledger: Arc::new(PostgresLendingLedger::new(pool)),
            }
        }
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state, config.request_timeout);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
