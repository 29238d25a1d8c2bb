// Realm orchestration: one world task plus the channels connections talk to.

use crate::domain::World;
use crate::use_cases::game::world_task;
use crate::use_cases::{GameEvent, RelayEvent, WorldUpdate};
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc, watch};

/// Channel sizes and cadence for a realm.
#[derive(Debug, Clone)]
pub struct RealmSettings {
    /// Capacity for inbound player events.
    pub input_channel_capacity: usize,
    /// Capacity for broadcast world updates.
    pub world_broadcast_capacity: usize,
    /// Capacity for relayed chat and disconnect notices.
    pub relay_broadcast_capacity: usize,
    /// Fixed tick interval for the game loop.
    pub tick_interval: Duration,
}

/// Channels shared by every connection to the realm.
#[derive(Clone)]
pub struct RealmHandle {
    /// Sender for game events into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    /// Broadcast sender for raw world snapshots.
    pub world_tx: broadcast::Sender<WorldUpdate>,
    /// Broadcast sender for serialized snapshots.
    pub world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    /// Watch sender holding the latest serialized snapshot.
    pub world_latest_tx: watch::Sender<Utf8Bytes>,
    /// Chat and disconnect notices fanned out to every connection.
    pub relay_tx: broadcast::Sender<RelayEvent>,
    /// Stops the world task when notified.
    pub shutdown: Arc<Notify>,
}

/// Spawns the authoritative world loop and returns its channels.
pub fn spawn_realm(world: World, settings: &RealmSettings) -> RealmHandle {
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(settings.input_channel_capacity);
    let (world_tx, _world_rx) =
        broadcast::channel::<WorldUpdate>(settings.world_broadcast_capacity);
    let (world_bytes_tx, _world_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(settings.world_broadcast_capacity);
    let (world_latest_tx, _world_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
    let (relay_tx, _relay_rx) =
        broadcast::channel::<RelayEvent>(settings.relay_broadcast_capacity);
    let shutdown = Arc::new(Notify::new());

    tokio::spawn(world_task(
        world,
        input_rx,
        world_tx.clone(),
        settings.tick_interval,
        shutdown.clone(),
    ));

    RealmHandle {
        input_tx,
        world_tx,
        world_bytes_tx,
        world_latest_tx,
        relay_tx,
        shutdown,
    }
}
