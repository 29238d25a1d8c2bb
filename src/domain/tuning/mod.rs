// Gameplay tuning, kept apart from runtime/server configuration.

pub mod combat;
pub mod enemy;
pub mod player;
pub mod progression;

pub use combat::{MeleeTuning, PopupTuning, ProjectileTuning};
pub use enemy::EnemyTuning;
pub use player::{GLYPH_SLOTS, HOTBAR_SLOTS, INVENTORY_SLOTS, PlayerTuning};
pub use progression::ProgressionTuning;

/// Every gameplay knob a world needs, grouped by concern.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldTuning {
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub melee: MeleeTuning,
    pub projectile: ProjectileTuning,
    pub progression: ProgressionTuning,
    pub popups: PopupTuning,
}
