use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("GAME_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000)
}

/// LDtk project holding the level the realm is built from.
pub fn level_path() -> String {
    env::var("LEVEL_PATH").unwrap_or_else(|_| "levels/level_0.json".to_string())
}

/// Level identifier (or iid) inside the LDtk project.
pub fn level_name() -> String {
    env::var("LEVEL_NAME").unwrap_or_else(|_| "Level_0".to_string())
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;
pub const CHAT_BROADCAST_CAPACITY: usize = 64;

pub const TICK_RATE: u32 = 60;
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / TICK_RATE as u64);
