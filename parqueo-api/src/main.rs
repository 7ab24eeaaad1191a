//! # Parqueo API Server
//!
//! REST API for the parqueo parking-lot reservation service: users
//! register/login, manage vehicles, browse spaces, and create or terminate
//! reservations.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p parqueo-api
//! ```

use parqueo_api::{
    app::{build_router, AppState},
    config::Config,
};
use parqueo_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parqueo_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Parqueo API v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    // An unreachable store at startup is fatal; the process refuses to
    // begin serving.
    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(db, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
