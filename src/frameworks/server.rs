// Framework bootstrap for the game server runtime.

use crate::domain::{LevelData, LevelSource, World, WorldTuning};
use crate::frameworks::config;
use crate::interface_adapters::level::LdtkLevelSource;
use crate::interface_adapters::net::{spawn_realm_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{RealmSettings, spawn_realm};

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves the realm built from `level` on an already bound listener.
pub async fn run(listener: tokio::net::TcpListener, level: LevelData) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state(&level);

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let level_path = config::level_path();
    let level_name = config::level_name();
    let level = LdtkLevelSource::new(&level_path)
        .load(&level_name)
        .map_err(|e| {
            tracing::error!(path = %level_path, level = %level_name, error = %e, "failed to load level");
            std::io::Error::other(format!("failed to load level {level_name}: {e}"))
        })?;
    tracing::info!(
        level = %level_name,
        enemies = level.enemy_spawns.len(),
        "level loaded"
    );

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, level).await
}

fn build_state(level: &LevelData) -> Arc<AppState> {
    // One realm per process; its world task owns every entity.
    let world = World::new(level, WorldTuning::default());
    let realm = spawn_realm(
        world,
        &RealmSettings {
            input_channel_capacity: config::INPUT_CHANNEL_CAPACITY,
            world_broadcast_capacity: config::WORLD_BROADCAST_CAPACITY,
            relay_broadcast_capacity: config::CHAT_BROADCAST_CAPACITY,
            tick_interval: config::TICK_INTERVAL,
        },
    );
    spawn_realm_serializer(&realm);

    Arc::new(AppState {
        realm,
        tick_rate: config::TICK_RATE,
    })
}
