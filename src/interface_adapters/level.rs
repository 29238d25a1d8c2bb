// LDtk project loader for the level-data port.

use crate::domain::level::{EnemySpawn, LevelData, LevelError, LevelSource};
use glam::Vec2;
use serde::Deserialize;
use std::path::PathBuf;

/// LDtk pixels to world units.
const LEVEL_SCALE: f32 = 4.0;
const ENTITIES_LAYER: &str = "Entities";
const PLAYER_SPAWN: &str = "PlayerSpawn";
const ENEMY_ENTITIES: [&str; 2] = ["Enemy", "EnemySpawn"];
const DEFAULT_ENEMY_NAME: &str = "Enemy";

#[derive(Debug, Deserialize)]
struct LdtkProject {
    #[serde(default)]
    levels: Vec<LdtkLevel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LdtkLevel {
    identifier: String,
    #[serde(default)]
    iid: String,
    #[serde(default)]
    world_x: f32,
    #[serde(default)]
    world_y: f32,
    #[serde(default)]
    layer_instances: Option<Vec<LdtkLayer>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LdtkLayer {
    #[serde(rename = "__identifier")]
    identifier: String,
    #[serde(default)]
    entity_instances: Vec<LdtkEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LdtkEntity {
    #[serde(rename = "__identifier")]
    identifier: String,
    px: [f32; 2],
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    field_instances: Vec<LdtkField>,
}

#[derive(Debug, Deserialize)]
struct LdtkField {
    #[serde(rename = "__identifier")]
    identifier: String,
    #[serde(rename = "__value", default)]
    value: serde_json::Value,
}

impl LdtkEntity {
    fn world_center(&self, level: &LdtkLevel) -> Vec2 {
        let local = Vec2::new(self.px[0] + self.width / 2.0, self.px[1] + self.height / 2.0);
        (Vec2::new(level.world_x, level.world_y) + local) * LEVEL_SCALE
    }

    fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.field_instances
            .iter()
            .find(|f| f.identifier == name)
            .map(|f| &f.value)
    }
}

/// Reads levels from an LDtk project file on disk.
#[derive(Debug, Clone)]
pub struct LdtkLevelSource {
    path: PathBuf,
}

impl LdtkLevelSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LevelSource for LdtkLevelSource {
    fn load(&self, level: &str) -> Result<LevelData, LevelError> {
        let raw = std::fs::read_to_string(&self.path)?;
        parse_level(&raw, level)
    }
}

/// Extracts the player spawn and enemy spawns of one level from LDtk JSON.
/// `level` matches either the level identifier or its iid.
pub fn parse_level(raw: &str, level: &str) -> Result<LevelData, LevelError> {
    let project: LdtkProject = serde_json::from_str(raw)?;
    let lvl = project
        .levels
        .iter()
        .find(|l| l.identifier == level || l.iid == level)
        .ok_or_else(|| LevelError::LevelNotFound(level.to_string()))?;

    let entities = lvl
        .layer_instances
        .iter()
        .flatten()
        .find(|layer| layer.identifier == ENTITIES_LAYER)
        .ok_or_else(|| LevelError::LayerNotFound {
            level: lvl.identifier.clone(),
            layer: ENTITIES_LAYER,
        })?;

    let player_spawn = entities
        .entity_instances
        .iter()
        .find(|e| e.identifier == PLAYER_SPAWN)
        .map(|e| e.world_center(lvl))
        .ok_or_else(|| LevelError::PlayerSpawnNotFound(lvl.identifier.clone()))?;

    let enemy_spawns = entities
        .entity_instances
        .iter()
        .filter(|e| ENEMY_ENTITIES.contains(&e.identifier.as_str()))
        .map(|e| EnemySpawn {
            pos: e.world_center(lvl),
            name: e
                .field("name")
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_ENEMY_NAME)
                .to_string(),
            level: e
                .field("level")
                .and_then(|v| v.as_u64())
                .and_then(|l| u32::try_from(l).ok())
                .unwrap_or(1)
                .max(1),
        })
        .collect();

    Ok(LevelData {
        player_spawn,
        enemy_spawns,
    })
}
