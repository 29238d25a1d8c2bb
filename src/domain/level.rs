// Level-data contract consumed once at world start.

use glam::Vec2;
use std::fmt;

/// Enemy spawn descriptor produced by level loading.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemySpawn {
    pub pos: Vec2,
    pub name: String,
    pub level: u32,
}

/// Everything the simulation needs from a level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelData {
    pub player_spawn: Vec2,
    pub enemy_spawns: Vec<EnemySpawn>,
}

/// Errors raised while loading level data. All of them are startup-fatal.
#[derive(Debug)]
pub enum LevelError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    LevelNotFound(String),
    LayerNotFound { level: String, layer: &'static str },
    PlayerSpawnNotFound(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(e) => write!(f, "failed to read level file: {e}"),
            LevelError::Parse(e) => write!(f, "failed to parse level file: {e}"),
            LevelError::LevelNotFound(level) => write!(f, "level not found: {level}"),
            LevelError::LayerNotFound { level, layer } => {
                write!(f, "{layer} layer not found in level {level}")
            }
            LevelError::PlayerSpawnNotFound(level) => {
                write!(f, "PlayerSpawn not found in level {level}")
            }
        }
    }
}

impl std::error::Error for LevelError {}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::Io(e)
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Parse(e)
    }
}

// Port for loading a named level.
pub trait LevelSource {
    fn load(&self, level: &str) -> Result<LevelData, LevelError>;
}
