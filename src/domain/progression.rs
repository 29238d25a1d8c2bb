// Experience, leveling, skill points and derived-stat recomputation.

use super::entity::{Entity, PlayerState};
use super::items::GlyphStat;
use super::tuning::ProgressionTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillStat {
    Health,
    Damage,
    Speed,
    AttackSpeed,
}

impl SkillStat {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "health" => Some(SkillStat::Health),
            "damage" => Some(SkillStat::Damage),
            "speed" => Some(SkillStat::Speed),
            "attackSpeed" => Some(SkillStat::AttackSpeed),
            _ => None,
        }
    }
}

/// Cooldown multiplier: `max(floor, 1 - points * gain)`.
pub fn attack_speed_scale(points: u32, tuning: &ProgressionTuning) -> f32 {
    (1.0 - points as f32 * tuning.attack_speed_per_point).max(tuning.min_attack_speed_scale)
}

/// Adds exp and applies every level-up it pays for. Returns the number of levels gained.
pub fn grant_exp(player: &mut PlayerState, amount: u32, tuning: &ProgressionTuning) -> u32 {
    player.exp = player.exp.saturating_add(amount);

    let mut gained = 0;
    while player.exp_to_next > 0 && player.exp >= player.exp_to_next {
        player.exp -= player.exp_to_next;
        player.level += 1;
        player.skill_points += 1;
        player.exp_to_next = tuning.exp_to_next(player.level);
        gained += 1;
    }
    gained
}

/// Spends one skill point on `stat_key`. Unknown keys and empty balances are rejected.
pub fn allocate_skill_point(entity: &mut Entity, stat_key: &str, tuning: &ProgressionTuning) -> bool {
    let Some(player) = entity.as_player_mut() else {
        return false;
    };
    let Some(stat) = SkillStat::parse(stat_key) else {
        return false;
    };
    if player.skill_points == 0 {
        return false;
    }

    player.skill_points -= 1;
    match stat {
        SkillStat::Health => player.stats.health += 1,
        SkillStat::Damage => player.stats.damage += 1,
        SkillStat::Speed => player.stats.speed += 1,
        SkillStat::AttackSpeed => player.stats.attack_speed += 1,
    }

    recompute_derived_stats(entity, tuning);
    true
}

/// Rebuilds max health, speed, damage multiplier and attack-speed scale from
/// base stats, allocated points and equipped glyphs.
pub fn recompute_derived_stats(entity: &mut Entity, tuning: &ProgressionTuning) {
    let Some(player) = entity.as_player_mut() else {
        return;
    };

    let health_bonus = f64::from(player.glyph_bonus(GlyphStat::Health));
    let speed_bonus = player.glyph_bonus(GlyphStat::Speed);
    let damage_bonus = player.glyph_bonus(GlyphStat::Damage);

    let raw_health = (f64::from(player.base_max_health)
        + f64::from(player.stats.health) * f64::from(tuning.health_per_point))
        * (1.0 + health_bonus);
    // Float error must not drop an exact product below its integer.
    let max_health = (raw_health + 1e-6).floor() as f32;

    let speed = (player.base_speed + player.stats.speed as f32 * tuning.speed_per_point)
        * (1.0 + speed_bonus);

    player.damage_multiplier =
        1.0 + player.stats.damage as f32 * tuning.damage_per_point + damage_bonus;
    player.attack_speed_scale = attack_speed_scale(player.stats.attack_speed, tuning);

    entity.set_max_health(max_health);
    entity.speed = speed;
}
