// Use cases layer: application workflows for the game server.

pub mod game;
pub mod realm;
pub mod types;

pub use realm::{RealmHandle, RealmSettings, spawn_realm};
pub use types::{ChatLine, GameEvent, JoinAccepted, RelayEvent, WorldUpdate};
