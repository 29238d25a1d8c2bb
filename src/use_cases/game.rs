use super::types::{GameEvent, JoinAccepted, WorldUpdate};
use crate::domain::World;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub async fn world_task(
    mut world: World,
    mut input_rx: mpsc::Receiver<GameEvent>,
    world_tx: broadcast::Sender<WorldUpdate>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    // Drive the fixed-step game loop at the configured tick rate.
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let dt = tick_interval.as_secs_f32();

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick = world.tick(), "world task shutting down");
                break;
            }
            _ = interval.tick() => {}
        }

        while let Ok(ev) = input_rx.try_recv() {
            apply_event(&mut world, ev);
        }

        world.step(dt);

        // No receivers just means nobody is connected yet.
        let _ = world_tx.send(Arc::new(world.snapshot()));
    }
}

/// Applies one queued event between ticks. Rejections are silent to the client.
pub fn apply_event(world: &mut World, ev: GameEvent) {
    match ev {
        GameEvent::Join {
            display_name,
            reply,
        } => {
            let (player_id, class) = world.add_player(&display_name);
            info!(%player_id, class = class.as_str(), "player joined");
            if reply.send(JoinAccepted { player_id, class }).is_err() {
                // The connection gave up before the world answered.
                world.remove_player(player_id);
            }
        }
        GameEvent::Leave { player_id } => {
            if world.remove_player(player_id) {
                info!(%player_id, "player left");
            }
        }
        GameEvent::Input { player_id, input } => {
            if !world.apply_input(player_id, &input) {
                debug!(%player_id, seq = input.seq, "stale or unknown input dropped");
            }
        }
        GameEvent::SkillUpgrade { player_id, stat } => {
            world.upgrade_skill(player_id, &stat);
        }
        GameEvent::Inventory { player_id, action } => {
            world.apply_inventory_action(player_id, action);
        }
    }
}
