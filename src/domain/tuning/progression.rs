/// Leveling curve and per-skill-point gains.

#[derive(Debug, Clone, Copy)]
pub struct ProgressionTuning {
    pub health_per_point: f32,
    pub damage_per_point: f32,
    pub speed_per_point: f32,
    pub attack_speed_per_point: f32,

    /// Floor for the attack cooldown scale.
    pub min_attack_speed_scale: f32,

    /// Exp needed for level 2; each level multiplies it by `exp_growth`.
    pub exp_base: f64,
    pub exp_growth: f64,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            health_per_point: 20.0,
            damage_per_point: 0.1,
            speed_per_point: 12.0,
            attack_speed_per_point: 0.06,
            min_attack_speed_scale: 0.4,
            exp_base: 100.0,
            exp_growth: 1.22,
        }
    }
}

impl ProgressionTuning {
    /// `floor(base * growth^(level - 1))`.
    pub fn exp_to_next(&self, level: u32) -> u32 {
        let exponent = level.max(1).saturating_sub(1) as i32;
        (self.exp_base * self.exp_growth.powi(exponent)).floor() as u32
    }
}
