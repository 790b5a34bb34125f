use clap::Parser;
use commerce_mcp::config::Config;
use commerce_mcp::error::AppError;
use commerce_mcp::mcp::Registry;
use commerce_mcp::router::create_app_router;
use commerce_mcp::state::AppState;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    // Logs go to stderr; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    // Fail fast on a broken tool table rather than on the first request
    Registry::shared()?;

    // Initialize application state
    let addr = config.bind;
    let state = Arc::new(AppState::new(config)?);

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server running");
    axum::serve(listener, app).await?;
    Ok(())
}
