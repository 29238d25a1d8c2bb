// Gameplay tuning for melee swings, thrown projectiles and combat popups.

#[derive(Debug, Clone, Copy)]
pub struct MeleeTuning {
    pub duration_ms: f64,

    /// Sweep start/end relative to the owner's facing, in radians.
    pub start_offset: f32,
    pub end_offset: f32,

    /// Segment span measured from the owner's center.
    pub inner_radius: f32,
    pub outer_radius: f32,

    /// Extra hit slack added to the target radius.
    pub thickness: f32,

    /// Progress is raised to this power so the swing starts slow.
    pub ease_power: f32,
}

impl Default for MeleeTuning {
    fn default() -> Self {
        Self {
            duration_ms: 220.0,
            start_offset: -1.1,
            end_offset: 1.1,
            inner_radius: 14.0,
            outer_radius: 82.0,
            thickness: 8.0,
            ease_power: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Travel speed in world units per second.
    pub speed: f32,

    /// Total distance travelled before the projectile is despawned.
    pub range: f32,

    /// World-space collision radius.
    pub radius: f32,

    /// Gap between the thrower's edge and the spawn point.
    pub spawn_padding: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 520.0,
            range: 420.0,
            radius: 6.0,
            spawn_padding: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PopupTuning {
    pub exp_lifetime_ms: f64,
    pub damage_lifetime_ms: f64,
}

impl Default for PopupTuning {
    fn default() -> Self {
        Self {
            exp_lifetime_ms: 1200.0,
            damage_lifetime_ms: 700.0,
        }
    }
}
