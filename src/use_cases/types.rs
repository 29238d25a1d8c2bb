// Use-case level inputs/outputs for the game loop.

use crate::domain::{EntityId, InventoryAction, PlayerClass, PlayerInput, WorldSnapshot};
use std::sync::Arc;
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum GameEvent {
    Join {
        display_name: String,
        reply: oneshot::Sender<JoinAccepted>,
    },
    Leave {
        player_id: EntityId,
    },
    Input {
        player_id: EntityId,
        input: PlayerInput,
    },
    SkillUpgrade {
        player_id: EntityId,
        stat: String,
    },
    Inventory {
        player_id: EntityId,
        action: InventoryAction,
    },
}

/// Identity handed back to a connection once the world has spawned its player.
#[derive(Debug, Clone, Copy)]
pub struct JoinAccepted {
    pub player_id: EntityId,
    pub class: PlayerClass,
}

/// Snapshot published after every tick; shared so broadcast clones stay cheap.
pub type WorldUpdate = Arc<WorldSnapshot>;

/// Chat line relayed to every connection as-is.
#[derive(Debug, Clone)]
pub struct ChatLine {
    pub player_id: EntityId,
    pub text: String,
    pub ts: u64,
}

/// Out-of-band notices relayed to every connection.
#[derive(Debug, Clone)]
pub enum RelayEvent {
    Chat(ChatLine),
    Disconnect { player_id: EntityId },
}
