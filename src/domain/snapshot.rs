// Read-only view of a world after a step, consumed by the transport layer.

use super::effects::{MeleeSwing, Popup, Projectile};
use super::entity::{Behavior, Entity, EntityKind, StatPoints};
use super::ids::{EffectId, EntityId};
use super::items::{Item, PlayerClass};
use glam::Vec2;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub class: PlayerClass,
    pub name: String,
    pub level: u32,
    pub exp: u32,
    pub exp_to_next: u32,
    pub skill_points: u32,
    pub stats: StatPoints,
    pub inventory: Vec<Option<Item>>,
    pub hotbar: Vec<Option<Item>>,
    pub weapon: Option<Item>,
    pub glyphs: Vec<Option<Item>>,
    pub selected_hotbar: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyView {
    pub name: String,
    pub level: u32,
    pub behavior: Behavior,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityDetails {
    Player(PlayerView),
    Enemy(EnemyView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub pos: Vec2,
    pub angle: f32,
    pub radius: f32,
    pub color: &'static str,
    pub health: f32,
    pub max_health: f32,
    pub details: EntityDetails,
}

impl From<&Entity> for EntitySnapshot {
    fn from(e: &Entity) -> Self {
        let details = match &e.kind {
            EntityKind::Player(p) => EntityDetails::Player(PlayerView {
                class: p.class,
                name: p.name.clone(),
                level: p.level,
                exp: p.exp,
                exp_to_next: p.exp_to_next,
                skill_points: p.skill_points,
                stats: p.stats,
                inventory: p.inventory.to_vec(),
                hotbar: p.hotbar.to_vec(),
                weapon: p.weapon,
                glyphs: p.glyphs.to_vec(),
                selected_hotbar: p.selected_hotbar,
            }),
            EntityKind::Enemy(enemy) => EntityDetails::Enemy(EnemyView {
                name: enemy.name.clone(),
                level: enemy.level,
                behavior: enemy.behavior,
            }),
        };

        Self {
            id: e.id,
            pos: e.pos,
            angle: e.angle,
            radius: e.radius,
            color: e.color,
            health: e.health(),
            max_health: e.max_health(),
            details,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSnapshot {
    pub id: EffectId,
    pub owner: EntityId,
    pub pos: Vec2,
    pub radius: f32,
    pub angle: f32,
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id,
            owner: p.owner,
            pos: p.pos,
            radius: p.radius,
            angle: p.angle(),
        }
    }
}

/// Blade geometry at the moment the snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingSnapshot {
    pub id: EffectId,
    pub owner: EntityId,
    pub start: Vec2,
    pub end: Vec2,
    pub thickness: f32,
    pub progress: f32,
    pub angle: f32,
}

impl SwingSnapshot {
    pub fn capture(swing: &MeleeSwing, owner: &Entity, now: f64) -> Self {
        let progress = swing.progress(now);
        let (start, end) = swing.segment(owner.pos, owner.angle, progress);
        Self {
            id: swing.id,
            owner: swing.owner,
            start,
            end,
            thickness: swing.thickness,
            progress,
            angle: swing.angle_at(owner.angle, progress),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub time_ms: f64,
    pub entities: BTreeMap<EntityId, EntitySnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub swings: Vec<SwingSnapshot>,
    pub exp_popups: Vec<Popup>,
    pub damage_popups: Vec<Popup>,
}

impl WorldSnapshot {
    pub fn entity(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.entities.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = (&EntitySnapshot, &PlayerView)> {
        self.entities.values().filter_map(|e| match &e.details {
            EntityDetails::Player(p) => Some((e, p)),
            EntityDetails::Enemy(_) => None,
        })
    }

    pub fn enemies(&self) -> impl Iterator<Item = (&EntitySnapshot, &EnemyView)> {
        self.entities.values().filter_map(|e| match &e.details {
            EntityDetails::Enemy(enemy) => Some((e, enemy)),
            EntityDetails::Player(_) => None,
        })
    }
}
