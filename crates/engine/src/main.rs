//! QuizSprint Engine - Main entry point.
//!
//! Runs the engine on in-memory storage with demo content and keeps the
//! background sweeps going until interrupted.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizsprint_domain::GameDate;
use quizsprint_engine::demo::seed_demo_content;
use quizsprint_engine::infrastructure::clock::{SeededRandom, SystemClock, SystemRandom};
use quizsprint_engine::infrastructure::config::EngineConfig;
use quizsprint_engine::infrastructure::ports::{ClockPort, RandomPort};
use quizsprint_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads `.env.local` and `.env` from the repo root before anything logs.
    let config = EngineConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizsprint_engine=debug,quizsprint_domain=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        season = %config.season_id,
        online_ttl_secs = config.online_ttl.as_secs(),
        demo_seed = ?config.demo_seed,
        "Starting QuizSprint Engine"
    );

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
    let random: Arc<dyn RandomPort> = match config.demo_seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(SystemRandom::new()),
    };

    let content_seed = config.demo_seed.unwrap_or_else(rand::random);
    let app = Arc::new(App::in_memory(config, clock.clone(), random));
    seed_demo_content(&app.repositories, content_seed, clock.now()).await?;

    // Build today's daily quiz up front so the first player does not pay for it.
    let today = GameDate::from_datetime(clock.now());
    let daily = app.use_cases.daily.quiz.execute(today).await?;
    tracing::info!(%today, daily_quiz_id = %daily.id(), "Daily quiz ready");

    // Spawn challenge expiry sweep
    let sweep_app = app.clone();
    let sweep_every = sweep_app.config.challenge_sweep;
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(sweep_every).await;
            match sweep_app.use_cases.duel.expire_challenges.execute().await {
                Ok(0) => {}
                Ok(expired) => tracing::info!(expired, "Expired stale challenges"),
                Err(e) => tracing::warn!(error = %e, "Challenge sweep failed"),
            }
        }
    });

    // Spawn event drain; the in-memory bus only grows otherwise
    let drain_app = app.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(drain_app.config.challenge_sweep).await;
            let events = drain_app.events.drain().await;
            if !events.is_empty() {
                tracing::debug!(count = events.len(), "Drained domain events");
            }
        }
    });

    tracing::info!("Engine running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    Ok(())
}
