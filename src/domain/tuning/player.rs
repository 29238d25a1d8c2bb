// Slot counts are fixed for every player.
pub const INVENTORY_SLOTS: usize = 20;
pub const HOTBAR_SLOTS: usize = 5;
pub const GLYPH_SLOTS: usize = 5;

/// Gameplay tuning for player characters.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).
#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Base movement speed in world units per second.
    pub speed: f32,

    /// World-space collision radius.
    pub radius: f32,

    /// Max health before skill points and glyphs.
    pub max_health: f32,

    /// Time between death and respawn.
    pub respawn_delay_ms: f64,

    /// Contact damage immunity window after taking a contact hit.
    pub contact_iframes_ms: f64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 220.0,
            radius: 18.0,
            max_health: 100.0,
            respawn_delay_ms: 3000.0,
            contact_iframes_ms: 600.0,
        }
    }
}
