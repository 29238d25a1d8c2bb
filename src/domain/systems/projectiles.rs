// Thrown projectiles: cooldown-gated spawn, straight-line travel, first-hit despawn.

use crate::domain::effects::{Popup, Projectile};
use crate::domain::entity::Entity;
use crate::domain::ids::{EntityId, IdAllocator};
use crate::domain::items::AttackKind;
use crate::domain::tuning::{PopupTuning, ProjectileTuning};
use glam::Vec2;
use std::collections::BTreeMap;
use tracing::debug;

/// Throws along the aim direction if the player wields a throw weapon that is off cooldown.
pub fn try_throw(
    e: &mut Entity,
    now: f64,
    ids: &mut IdAllocator,
    tuning: &ProjectileTuning,
) -> Option<Projectile> {
    let (owner, origin, body_radius) = (e.id, e.pos, e.radius);
    let player = e.as_player_mut()?;
    let weapon = *player.equipped_weapon()?;
    if weapon.attack_kind != AttackKind::Throw {
        return None;
    }

    let cooldown = weapon.cooldown_ms * f64::from(player.attack_speed_scale);
    if now - player.last_throw_at < cooldown {
        return None;
    }
    player.last_throw_at = now;

    let dir = Vec2::from_angle(player.input.aim);
    Some(Projectile {
        id: ids.effect(),
        owner,
        // Spawn just outside the thrower's body, in the direction it's aiming.
        pos: origin + dir * (body_radius + tuning.radius + tuning.spawn_padding),
        dir,
        speed: tuning.speed,
        remaining_range: tuning.range,
        radius: tuning.radius,
        damage: (weapon.damage * player.damage_multiplier).round(),
    })
}

pub fn tick_projectiles(
    entities: &mut BTreeMap<EntityId, Entity>,
    projectiles: &mut Vec<Projectile>,
    popups: &mut Vec<Popup>,
    dt: f32,
    now: f64,
    popup_tuning: &PopupTuning,
) {
    // Integrate projectile movement and remaining range.
    for p in projectiles.iter_mut() {
        let step = p.speed * dt;
        p.pos += p.dir * step;
        p.remaining_range -= step;
    }

    // Projectile vs enemy collision (naive O(P*E) for now).
    // A hit zeroes the remaining range so the retain below despawns it.
    for p in projectiles.iter_mut() {
        if p.remaining_range <= 0.0 {
            continue;
        }
        if !entities.contains_key(&p.owner) {
            p.remaining_range = 0.0;
            continue;
        }

        for enemy in entities.values_mut() {
            if !enemy.is_enemy() || !enemy.is_alive() {
                continue;
            }

            let hit_radius = enemy.radius + p.radius;
            if enemy.pos.distance_squared(p.pos) <= hit_radius * hit_radius {
                let dealt = enemy.apply_damage(p.damage, p.owner);
                popups.push(Popup::new(
                    enemy.id,
                    dealt,
                    enemy.pos,
                    now,
                    popup_tuning.damage_lifetime_ms,
                ));
                debug!(
                    victim_id = %enemy.id,
                    thrower_id = %p.owner,
                    projectile_id = %p.id,
                    victim_hp = enemy.health(),
                    "projectile hit"
                );
                p.remaining_range = 0.0;
                break;
            }
        }
    }

    projectiles.retain(|p| p.remaining_range > 0.0);
}
