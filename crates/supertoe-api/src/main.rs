//! Super Tic-Tac-Toe server entry point.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use supertoe_api::broadcast::ChannelBroadcaster;
use supertoe_api::config::Config;
use supertoe_api::error::AppError;
use supertoe_api::state::AppState;
use supertoe_api::{routes, telemetry};
use supertoe_core::clock::SystemClock;
use supertoe_core::store::StateStore;
use supertoe_game::application::service::{GameService, GameSettings};
use supertoe_store::{InMemoryStateStore, PgStateStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    let tracer_provider = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Super Tic-Tac-Toe server");

    let store = connect_store(&config).await?;
    let broadcaster = Arc::new(ChannelBroadcaster::new(config.broadcast_capacity));
    let settings = GameSettings {
        key: config.game_key.clone(),
        move_cooldown_seconds: config.move_cooldown_seconds,
    };
    let game = GameService::new(settings, Arc::new(SystemClock), store, broadcaster.clone());
    let app_state = AppState::new(Arc::new(game), broadcaster);

    // TODO: Replace CorsLayer::permissive() with restricted origins once the
    // client is served from a known host.
    let app = routes::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(provider) = tracer_provider {
        telemetry::shutdown(&provider);
    }

    Ok(())
}

/// PostgreSQL when `DATABASE_URL` is set, otherwise process-local memory.
async fn connect_store(config: &Config) -> Result<Arc<dyn StateStore>, AppError> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; game state will not survive a restart");
        return Ok(Arc::new(InMemoryStateStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("connected to PostgreSQL state store");

    Ok(Arc::new(PgStateStore::new(pool)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
