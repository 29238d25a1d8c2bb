// Entity model: one representation for every actor, tagged by kind.
//
// Health is private so every mutation goes through the clamping helpers below.

use super::ids::EntityId;
use super::items::{GlyphStat, Item, PlayerClass, Weapon};
use super::level::EnemySpawn;
use super::tuning::{
    EnemyTuning, GLYPH_SLOTS, HOTBAR_SLOTS, INVENTORY_SLOTS, PlayerTuning,
};
use glam::Vec2;
use std::f32::consts::{PI, TAU};

const PLAYER_COLORS: [&str; 5] = ["#4aa3ff", "#ff6b6b", "#7CFF6B", "#ffd166", "#b388ff"];

/// Wraps an angle into (-π, π].
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Latest raw input received from a client.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub seq: i64,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub aim: f32,
    pub attack_melee: bool,
    pub attack_throw: bool,
}

/// Directional state kept between inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub aim: f32,
}

impl MoveInput {
    /// Un-normalized direction from the four flags (+y is down).
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir
    }
}

/// Allocated skill points per stat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatPoints {
    pub health: u32,
    pub damage: u32,
    pub speed: u32,
    pub attack_speed: u32,
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub class: PlayerClass,
    pub name: String,

    // Input state (do not serialize to clients).
    pub input: MoveInput,
    pub last_input_seq: i64,
    pub pending_melee: bool,
    pub pending_throw: bool,

    // Progression.
    pub base_max_health: f32,
    pub base_speed: f32,
    pub level: u32,
    pub exp: u32,
    pub exp_to_next: u32,
    pub skill_points: u32,
    pub stats: StatPoints,
    pub damage_multiplier: f32,
    pub attack_speed_scale: f32,

    // Cooldowns, world clock milliseconds.
    pub last_melee_at: f64,
    pub last_throw_at: f64,
    pub last_damage_at: f64,

    // Equipment.
    pub inventory: [Option<Item>; INVENTORY_SLOTS],
    pub hotbar: [Option<Item>; HOTBAR_SLOTS],
    pub weapon: Option<Item>,
    pub glyphs: [Option<Item>; GLYPH_SLOTS],
    pub selected_hotbar: usize,

    pub spawn: Vec2,
    /// Set while a respawn ticket for this player sits in the world queue.
    pub awaiting_respawn: bool,
}

impl PlayerState {
    /// Applies an input if its sequence number is newer than the last applied one.
    pub fn apply_input(&mut self, input: &PlayerInput) -> bool {
        if input.seq <= self.last_input_seq {
            return false;
        }

        self.last_input_seq = input.seq;
        self.input.up = input.up;
        self.input.down = input.down;
        self.input.left = input.left;
        self.input.right = input.right;
        if input.aim.is_finite() {
            self.input.aim = normalize_angle(input.aim);
        }
        if input.attack_melee {
            self.pending_melee = true;
        }
        if input.attack_throw {
            self.pending_throw = true;
        }
        true
    }

    /// Drops held directions and queued attacks; aim and sequence survive.
    pub fn clear_transient_input(&mut self) {
        self.input.up = false;
        self.input.down = false;
        self.input.left = false;
        self.input.right = false;
        self.pending_melee = false;
        self.pending_throw = false;
    }

    pub fn equipped_weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref().and_then(Item::as_weapon)
    }

    /// Sum of `percent_boost` over equipped glyphs for one stat.
    pub fn glyph_bonus(&self, stat: GlyphStat) -> f32 {
        self.glyphs
            .iter()
            .flatten()
            .filter_map(Item::as_glyph)
            .filter(|glyph| glyph.stat == stat)
            .map(|glyph| glyph.percent_boost)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Idle,
    Chasing,
}

impl Behavior {
    pub fn as_str(self) -> &'static str {
        match self {
            Behavior::Idle => "idle",
            Behavior::Chasing => "chasing",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnemyState {
    pub spawn: Vec2,
    pub name: String,
    pub level: u32,
    pub exp_reward: u32,
    pub respawn_delay_ms: f64,
    pub contact_damage: f32,
    pub aggro_range: f32,
    pub leash_distance: f32,
    pub behavior: Behavior,
    pub target: Option<EntityId>,
}

#[derive(Debug, Clone)]
pub enum EntityKind {
    Player(Box<PlayerState>),
    Enemy(EnemyState),
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Vec2,
    pub angle: f32,
    pub radius: f32,
    pub color: &'static str,
    pub speed: f32,
    health: f32,
    max_health: f32,
    /// Whoever damaged this entity last; credited on death.
    pub last_hit_by: Option<EntityId>,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new_player(
        id: EntityId,
        spawn: Vec2,
        class: PlayerClass,
        name: &str,
        tuning: &PlayerTuning,
        exp_to_next: u32,
    ) -> Self {
        let name = name.trim();
        let name = if name.is_empty() { "Player" } else { name };
        let color = PLAYER_COLORS[(id.0 % PLAYER_COLORS.len() as u64) as usize];

        Self {
            id,
            pos: spawn,
            angle: 0.0,
            radius: tuning.radius,
            color,
            speed: tuning.speed,
            health: tuning.max_health,
            max_health: tuning.max_health,
            last_hit_by: None,
            kind: EntityKind::Player(Box::new(PlayerState {
                class,
                name: name.to_string(),
                input: MoveInput::default(),
                last_input_seq: 0,
                pending_melee: false,
                pending_throw: false,
                base_max_health: tuning.max_health,
                base_speed: tuning.speed,
                level: 1,
                exp: 0,
                exp_to_next,
                skill_points: 0,
                stats: StatPoints::default(),
                damage_multiplier: 1.0,
                attack_speed_scale: 1.0,
                last_melee_at: f64::NEG_INFINITY,
                last_throw_at: f64::NEG_INFINITY,
                last_damage_at: f64::NEG_INFINITY,
                inventory: std::array::from_fn(|_| None),
                hotbar: std::array::from_fn(|_| None),
                weapon: None,
                glyphs: std::array::from_fn(|_| None),
                selected_hotbar: 0,
                spawn,
                awaiting_respawn: false,
            })),
        }
    }

    /// Builds a fresh enemy with stats scaled to the spawn's level.
    pub fn new_enemy(id: EntityId, spawn: &EnemySpawn, tuning: &EnemyTuning) -> Self {
        let level = spawn.level.max(1);
        let max_health = tuning.max_health_for(level);
        let name = spawn.name.trim();
        let name = if name.is_empty() { "Enemy" } else { name };

        Self {
            id,
            pos: spawn.pos,
            angle: 0.0,
            radius: tuning.radius,
            color: tuning.color,
            speed: tuning.speed,
            health: max_health,
            max_health,
            last_hit_by: None,
            kind: EntityKind::Enemy(EnemyState {
                spawn: spawn.pos,
                name: name.to_string(),
                level,
                exp_reward: tuning.exp_reward_for(level),
                respawn_delay_ms: tuning.respawn_delay_ms,
                contact_damage: tuning.contact_damage_for(level),
                aggro_range: tuning.aggro_range,
                leash_distance: tuning.leash_distance,
                behavior: Behavior::Idle,
                target: None,
            }),
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn set_health(&mut self, health: f32) {
        self.health = health.clamp(0.0, self.max_health);
    }

    /// Changes max health and re-clamps current health without healing.
    pub fn set_max_health(&mut self, max_health: f32) {
        self.max_health = max_health.max(0.0);
        self.health = self.health.clamp(0.0, self.max_health);
    }

    pub fn heal_full(&mut self) {
        self.health = self.max_health;
    }

    /// Applies damage and records the source for kill credit. Returns the damage dealt.
    pub fn apply_damage(&mut self, amount: f32, source: EntityId) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.set_health(before - amount);
        self.last_hit_by = Some(source);
        before - self.health
    }

    /// Moves along `dir` at `speed`; a zero direction is a no-op.
    pub fn move_normalized(&mut self, dir: Vec2, dt: f32) {
        if let Some(unit) = dir.try_normalize() {
            self.pos += unit * self.speed * dt;
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy(_))
    }

    pub fn as_player(&self) -> Option<&PlayerState> {
        match &self.kind {
            EntityKind::Player(p) => Some(p),
            EntityKind::Enemy(_) => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.kind {
            EntityKind::Player(p) => Some(p),
            EntityKind::Enemy(_) => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyState> {
        match &self.kind {
            EntityKind::Enemy(e) => Some(e),
            EntityKind::Player(_) => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyState> {
        match &mut self.kind {
            EntityKind::Enemy(e) => Some(e),
            EntityKind::Player(_) => None,
        }
    }
}
