use dotenvy::dotenv;
use product_service::{
    api::{self, AppState},
    config::{database, settings},
    core::product,
    errors::Result,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Resolves once Ctrl+C or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables can also be set externally
    dotenv().ok();

    // 3. Resolve settings from config.toml and the environment
    let app_config = settings::load_app_config()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Open the store and make sure the table exists
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::ensure_schema(&db)
        .await
        .inspect_err(|e| error!("Failed to create products table: {}", e))?;

    // 5. Seed initial products on an empty store
    let seeded = product::seed_if_empty(&db)
        .await
        .inspect_err(|e| error!("Failed to seed products: {}", e))?;
    if seeded > 0 {
        info!("Seeded {} products", seeded);
    }

    // 6. Serve /products until shut down
    let address = app_config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", address, e))?;

    info!("App start on :{}", app_config.port);
    info!("Use APP_PORT environment variable");

    axum::serve(listener, api::router(AppState::new(db)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| error!("Server error: {}", e))?;

    Ok(())
}
