use dotenvy::dotenv;
use license_buddy::api::{AppState, build_router};
use license_buddy::config::{database, load_app_configuration};
use license_buddy::errors::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Open the database and make sure the schema exists
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Serve
    let state = AppState::new(db, &app_config.admin_token, app_config.default_days);
    let app = build_router(state);

    let address = app_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", address, e))?;
    info!("License server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("License server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
