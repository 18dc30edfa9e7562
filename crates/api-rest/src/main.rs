//! MediLink REST API server binary.
//!
//! Resolves configuration from the environment once at startup, opens the
//! database (applying the embedded schema) and serves the REST API.

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::state::AppState;
use medilink_core::{db, AppConfig};

/// # Environment Variables
/// - `SECRET_KEY`: JWT signing secret (required)
/// - `DATABASE_URL`: SQLite URL (default: "sqlite://medilink.db")
/// - `MEDILINK_ADDR`: Server address (default: "0.0.0.0:8000")
/// - `ALLOWED_ORIGINS`: Comma-separated CORS origins
///   (default: "http://localhost:3000")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is missing or invalid,
/// - the database cannot be opened, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("medilink_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;

    tracing::info!("-- Starting MediLink REST API on {}", config.bind_addr());

    let pool = db::connect(config.database_url()).await?;
    let state = AppState::new(pool, &config);
    let app = api_rest::app(state, config.allowed_origins());

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn load_config() -> anyhow::Result<AppConfig> {
    let jwt_secret = std::env::var("SECRET_KEY")
        .map_err(|_| anyhow::anyhow!("SECRET_KEY must be set"))?;
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://medilink.db".into());
    let bind_addr = std::env::var("MEDILINK_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".into())
        .split(',')
        .map(|origin| origin.trim().to_owned())
        .filter(|origin| !origin.is_empty())
        .collect();

    Ok(AppConfig::new(
        database_url,
        jwt_secret,
        bind_addr,
        allowed_origins,
    )?)
}
