/// Gameplay tuning for enemies. Health, exp and contact damage are level-1 values.

#[derive(Debug, Clone, Copy)]
pub struct EnemyTuning {
    /// Movement speed in world units per second.
    pub speed: f32,

    /// World-space collision radius.
    pub radius: f32,

    pub base_max_health: f32,
    pub base_exp_reward: u32,
    pub base_contact_damage: f32,

    /// Distance within which an idle enemy starts chasing.
    pub aggro_range: f32,

    /// Chasing enemies farther than this from spawn give up and walk home.
    pub leash_distance: f32,

    pub respawn_delay_ms: f64,

    pub color: &'static str,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            speed: 120.0,
            radius: 16.0,
            base_max_health: 40.0,
            base_exp_reward: 45,
            base_contact_damage: 10.0,
            aggro_range: 260.0,
            leash_distance: 300.0,
            respawn_delay_ms: 5000.0,
            color: "#ff6b6b",
        }
    }
}

impl EnemyTuning {
    /// Doubles every ten levels: `2^((level - 1) / 10)`.
    pub fn level_multiplier(level: u32) -> f32 {
        2f32.powf(level.max(1).saturating_sub(1) as f32 / 10.0)
    }

    pub fn max_health_for(&self, level: u32) -> f32 {
        (self.base_max_health * Self::level_multiplier(level)).round()
    }

    pub fn exp_reward_for(&self, level: u32) -> u32 {
        (self.base_exp_reward as f32 * Self::level_multiplier(level)).round() as u32
    }

    pub fn contact_damage_for(&self, level: u32) -> f32 {
        (self.base_contact_damage * Self::level_multiplier(level)).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_scaling_doubles_every_ten_levels() {
        let tuning = EnemyTuning::default();
        assert_eq!(tuning.max_health_for(1), 40.0);
        assert_eq!(tuning.exp_reward_for(1), 45);
        assert_eq!(tuning.max_health_for(11), 80.0);
        assert_eq!(tuning.exp_reward_for(11), 90);
        assert_eq!(tuning.contact_damage_for(11), 20.0);
    }

    #[test]
    fn level_zero_is_treated_as_level_one() {
        assert_eq!(EnemyTuning::level_multiplier(0), 1.0);
    }
}
