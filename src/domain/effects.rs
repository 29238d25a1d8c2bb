// Transient combat effects and scheduled events owned by a world.

use super::ids::{EffectId, EntityId};
use super::level::EnemySpawn;
use glam::Vec2;
use std::collections::HashSet;

/// A rotating line segment anchored on its owner.
#[derive(Debug, Clone)]
pub struct MeleeSwing {
    pub id: EffectId,
    pub owner: EntityId,
    pub started_at: f64,
    pub duration_ms: f64,
    pub start_offset: f32,
    pub end_offset: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub thickness: f32,
    pub ease_power: f32,
    pub damage: f32,
    /// Enemies already struck by this swing; each is hit at most once.
    pub hit: HashSet<EntityId>,
}

impl MeleeSwing {
    pub fn progress(&self, now: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Absolute segment angle at `progress` for an owner facing `owner_angle`.
    pub fn angle_at(&self, owner_angle: f32, progress: f32) -> f32 {
        let eased = progress.clamp(0.0, 1.0).powf(self.ease_power);
        owner_angle + self.start_offset + (self.end_offset - self.start_offset) * eased
    }

    /// Inner and outer endpoints of the blade.
    pub fn segment(&self, origin: Vec2, owner_angle: f32, progress: f32) -> (Vec2, Vec2) {
        let dir = Vec2::from_angle(self.angle_at(owner_angle, progress));
        (
            origin + dir * self.inner_radius,
            origin + dir * self.outer_radius,
        )
    }
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EffectId,
    pub owner: EntityId,
    pub pos: Vec2,
    /// Unit travel direction.
    pub dir: Vec2,
    pub speed: f32,
    pub remaining_range: f32,
    pub radius: f32,
    pub damage: f32,
}

impl Projectile {
    pub fn angle(&self) -> f32 {
        self.dir.y.atan2(self.dir.x)
    }
}

#[derive(Debug, Clone)]
pub struct EnemyRespawn {
    pub id: EntityId,
    pub spawn: EnemySpawn,
    pub fire_at: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerRespawn {
    pub id: EntityId,
    pub fire_at: f64,
}

/// Floating number shown to clients (exp gain or damage taken).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Popup {
    pub subject: EntityId,
    pub amount: f32,
    pub pos: Vec2,
    pub created_at: f64,
    pub expires_at: f64,
}

impl Popup {
    pub fn new(subject: EntityId, amount: f32, pos: Vec2, now: f64, lifetime_ms: f64) -> Self {
        Self {
            subject,
            amount,
            pos,
            created_at: now,
            expires_at: now + lifetime_ms,
        }
    }

    pub fn is_live(&self, now: f64) -> bool {
        self.expires_at > now
    }
}

/// Squared distance from `p` to the segment `a..b`.
pub fn distance_sq_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance_squared(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(distance_sq_to_segment(Vec2::new(5.0, 3.0), a, b), 9.0);
        assert_eq!(distance_sq_to_segment(Vec2::new(-4.0, 0.0), a, b), 16.0);
        assert_eq!(distance_sq_to_segment(Vec2::new(13.0, 4.0), a, b), 25.0);
        assert_eq!(distance_sq_to_segment(Vec2::new(1.0, 1.0), a, a), 2.0);
    }

    #[test]
    fn swing_starts_slow_and_ends_at_end_offset() {
        let swing = MeleeSwing {
            id: EffectId(1),
            owner: EntityId(1),
            started_at: 0.0,
            duration_ms: 200.0,
            start_offset: -1.0,
            end_offset: 1.0,
            inner_radius: 10.0,
            outer_radius: 50.0,
            thickness: 4.0,
            ease_power: 2.0,
            damage: 1.0,
            hit: HashSet::new(),
        };
        assert_eq!(swing.progress(100.0), 0.5);
        assert_eq!(swing.progress(500.0), 1.0);
        // Half the time covers only a quarter of the sweep.
        assert!((swing.angle_at(0.0, 0.5) - -0.5).abs() < 1e-6);
        assert!((swing.angle_at(0.0, 1.0) - 1.0).abs() < 1e-6);
    }
}
