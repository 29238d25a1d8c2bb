// Enemy behavior: idle (walk home) and chasing (steer at the target).

use crate::domain::entity::{Behavior, Entity};
use crate::domain::ids::EntityId;
use glam::Vec2;

/// A living player an enemy may notice this tick.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub id: EntityId,
    pub pos: Vec2,
}

/// Nearest target by squared distance, with that distance.
fn nearest(from: Vec2, targets: &[Target]) -> Option<(Target, f32)> {
    targets
        .iter()
        .map(|t| (*t, t.pos.distance_squared(from)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn face_and_move(e: &mut Entity, dir: Vec2, dt: f32) {
    e.move_normalized(dir, dt);
    e.angle = dir.y.atan2(dir.x);
}

pub fn step_enemy(e: &mut Entity, targets: &[Target], dt: f32) {
    if !e.is_alive() {
        return;
    }
    let pos = e.pos;
    let Some(enemy) = e.as_enemy_mut() else {
        return;
    };

    let aggro_sq = enemy.aggro_range * enemy.aggro_range;
    let in_range = nearest(pos, targets)
        .filter(|(_, dist_sq)| *dist_sq <= aggro_sq)
        .map(|(t, _)| t);

    if enemy.behavior == Behavior::Idle {
        match in_range {
            Some(t) => {
                enemy.behavior = Behavior::Chasing;
                enemy.target = Some(t.id);
            }
            None => {
                let home = enemy.spawn - pos;
                if home.length_squared() > 1.0 {
                    face_and_move(e, home, dt);
                }
                return;
            }
        }
    }

    let current = enemy
        .target
        .and_then(|id| targets.iter().find(|t| t.id == id).copied())
        .filter(|t| t.pos.distance_squared(pos) <= aggro_sq);

    let Some(target) = current.or(in_range) else {
        enemy.behavior = Behavior::Idle;
        enemy.target = None;
        return;
    };
    enemy.target = Some(target.id);

    face_and_move(e, target.pos - pos, dt);
}
