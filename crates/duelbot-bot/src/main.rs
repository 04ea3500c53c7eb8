//! Duelbot server entry point.

use std::sync::{Arc, Mutex};

use duelbot_bot::commands::default_router;
use duelbot_bot::config::{self, BotConfig};
use duelbot_bot::dispatch::{Bot, DEFAULT_INBOX_CAPACITY, spawn_dispatcher};
use duelbot_bot::error::AppError;
use duelbot_bot::metadata::StaticStreamMetadata;
use duelbot_bot::outbox::Outbox;
use duelbot_bot::relay::LogRelay;
use duelbot_bot::routes;
use duelbot_bot::state::{AppState, BotState};
use duelbot_core::clock::SystemClock;
use duelbot_core::rng::{DeterministicRng, OsSeededRng};
use duelbot_core::transport::{ChatTransport, RelayNotifier};
use duelbot_duel::application::coordinator::DuelCoordinator;
use duelbot_duel::domain::arena::DuelTimings;
use duelbot_progression::repository::ProgressionRepository;
use duelbot_store::PgProgressionRepository;
use duelbot_store::migrations::run_migrations;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting duelbot");

    let config = BotConfig::from_env()?;
    let addr = config.listen_addr()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.db_timeout)
        .connect(&config.database_url)
        .await?;
    if config.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("migrations applied");
    }

    let progression: Arc<dyn ProgressionRepository> = Arc::new(
        PgProgressionRepository::with_deadline(pool, config.db_timeout),
    );
    let catalog = progression.stat_types().await?;

    // Catalogs are validated before the bot accepts any traffic.
    let templates = config::load_duel_templates(&config.config_dir)?;
    let labels = config::load_stat_labels(&config.config_dir, &catalog)?;
    let greetings = config::load_greetings(&config.config_dir)?;
    let friends = config::load_friends(&config.config_dir)?;

    let rng: Arc<Mutex<dyn DeterministicRng>> = Arc::new(Mutex::new(OsSeededRng::new()));
    let outbox = Arc::new(Outbox::default());
    let transport: Arc<dyn ChatTransport> = outbox.clone();
    let relay: Arc<dyn RelayNotifier> = Arc::new(LogRelay::new(SystemClock));

    let duels = DuelCoordinator::new(
        templates,
        Arc::clone(&rng),
        Arc::clone(&progression),
        Arc::clone(&transport),
        config.channel.clone(),
        DuelTimings::default(),
    );
    let bot_state = BotState {
        channel: config.channel.clone(),
        progression,
        duels: duels.clone(),
        labels,
        greetings,
        friends,
        metadata: Arc::new(StaticStreamMetadata::new(
            config.stream_title.clone(),
            config.stream_game.clone(),
        )),
        rng,
    };
    let bot = Bot::new(
        bot_state,
        default_router(),
        transport,
        Arc::clone(&relay),
        config.bot_username.clone(),
    );
    let (inbox, dispatcher) = spawn_dispatcher(bot, DEFAULT_INBOX_CAPACITY);

    if let Err(e) = relay
        .send_message(&format!("✅ duelbot started in #{}", config.channel))
        .await
    {
        tracing::warn!(error = %e, "startup notice failed");
    }

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::app(AppState::new(inbox, outbox, duels, config.channel.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Dropping the router closed the last inbox; let the dispatcher drain.
    if let Err(e) = dispatcher.await {
        tracing::error!(error = %e, "dispatcher task failed");
    }
    tracing::info!("duelbot stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown requested");
}
