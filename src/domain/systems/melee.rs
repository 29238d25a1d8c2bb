// Melee swings: cooldown-gated start and a per-tick sweep against living enemies.

use crate::domain::effects::{MeleeSwing, Popup, distance_sq_to_segment};
use crate::domain::entity::Entity;
use crate::domain::ids::{EntityId, IdAllocator};
use crate::domain::items::AttackKind;
use crate::domain::tuning::{MeleeTuning, PopupTuning};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Starts a swing if the player wields a melee weapon that is off cooldown.
pub fn try_start_swing(
    e: &mut Entity,
    now: f64,
    ids: &mut IdAllocator,
    tuning: &MeleeTuning,
) -> Option<MeleeSwing> {
    let owner = e.id;
    let player = e.as_player_mut()?;
    let weapon = *player.equipped_weapon()?;
    if weapon.attack_kind != AttackKind::Melee {
        return None;
    }

    let cooldown = weapon.cooldown_ms * f64::from(player.attack_speed_scale);
    if now - player.last_melee_at < cooldown {
        return None;
    }
    player.last_melee_at = now;

    Some(MeleeSwing {
        id: ids.effect(),
        owner,
        started_at: now,
        duration_ms: tuning.duration_ms,
        start_offset: tuning.start_offset,
        end_offset: tuning.end_offset,
        inner_radius: tuning.inner_radius,
        outer_radius: tuning.outer_radius,
        thickness: tuning.thickness,
        ease_power: tuning.ease_power,
        damage: (weapon.damage * player.damage_multiplier).round(),
        hit: HashSet::new(),
    })
}

/// Advances every swing, damaging enemies the blade touches, and drops finished
/// swings and swings whose owner is gone or dead.
pub fn tick_swings(
    entities: &mut BTreeMap<EntityId, Entity>,
    swings: &mut Vec<MeleeSwing>,
    popups: &mut Vec<Popup>,
    now: f64,
    popup_tuning: &PopupTuning,
) {
    swings.retain_mut(|swing| {
        let Some(owner) = entities.get(&swing.owner).filter(|o| o.is_alive()) else {
            return false;
        };
        let progress = swing.progress(now);
        let (inner, outer) = swing.segment(owner.pos, owner.angle, progress);

        for enemy in entities.values_mut() {
            if !enemy.is_enemy() || !enemy.is_alive() || swing.hit.contains(&enemy.id) {
                continue;
            }

            let reach = enemy.radius + swing.thickness;
            if distance_sq_to_segment(enemy.pos, inner, outer) > reach * reach {
                continue;
            }

            let dealt = enemy.apply_damage(swing.damage, swing.owner);
            swing.hit.insert(enemy.id);
            popups.push(Popup::new(
                enemy.id,
                dealt,
                enemy.pos,
                now,
                popup_tuning.damage_lifetime_ms,
            ));
            debug!(
                attacker_id = %swing.owner,
                victim_id = %enemy.id,
                damage = dealt,
                victim_hp = enemy.health(),
                "melee hit"
            );
        }

        progress < 1.0
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::items::{PRACTICE_THROWER, PlayerClass, TRAINING_BLADE};
    use crate::domain::level::EnemySpawn;
    use crate::domain::tuning::{EnemyTuning, PlayerTuning};
    use glam::Vec2;

    struct Arena {
        ids: IdAllocator,
        entities: BTreeMap<EntityId, Entity>,
        player: EntityId,
    }

    fn arena(weapon_blade: bool) -> Arena {
        let mut ids = IdAllocator::default();
        let player = ids.entity();
        let mut e = Entity::new_player(
            player,
            Vec2::ZERO,
            PlayerClass::Blade,
            "swinger",
            &PlayerTuning::default(),
            100,
        );
        let weapon = if weapon_blade {
            TRAINING_BLADE.create(ids.item())
        } else {
            PRACTICE_THROWER.create(ids.item())
        };
        if let Some(p) = e.as_player_mut() {
            p.weapon = Some(weapon);
        }
        let mut entities = BTreeMap::new();
        entities.insert(player, e);
        Arena {
            ids,
            entities,
            player,
        }
    }

    fn add_enemy(arena: &mut Arena, pos: Vec2) -> EntityId {
        let id = arena.ids.entity();
        let spawn = EnemySpawn {
            pos,
            name: "Dummy".to_string(),
            level: 1,
        };
        arena
            .entities
            .insert(id, Entity::new_enemy(id, &spawn, &EnemyTuning::default()));
        id
    }

    fn start(arena: &mut Arena, now: f64) -> Option<MeleeSwing> {
        let e = arena.entities.get_mut(&arena.player).expect("player");
        try_start_swing(e, now, &mut arena.ids, &MeleeTuning::default())
    }

    #[test]
    fn enemy_in_front_is_hit_exactly_once() {
        let mut arena = arena(true);
        let enemy = add_enemy(&mut arena, Vec2::new(40.0, 0.0));
        let swing = start(&mut arena, 0.0).expect("swing");
        let mut swings = vec![swing];
        let mut popups = Vec::new();

        let mut now = 0.0;
        while !swings.is_empty() {
            tick_swings(
                &mut arena.entities,
                &mut swings,
                &mut popups,
                now,
                &PopupTuning::default(),
            );
            now += 1000.0 / 60.0;
        }

        assert_eq!(popups.len(), 1);
        assert_eq!(arena.entities[&enemy].health(), 20.0);
        assert_eq!(arena.entities[&enemy].last_hit_by, Some(arena.player));
    }

    #[test]
    fn recorded_enemy_is_never_hit_again() {
        let mut arena = arena(true);
        let enemy = add_enemy(&mut arena, Vec2::new(40.0, 0.0));
        let mut swing = start(&mut arena, 0.0).expect("swing");
        swing.hit.insert(enemy);
        let mut swings = vec![swing];
        let mut popups = Vec::new();

        for tick in 0..20_u32 {
            tick_swings(
                &mut arena.entities,
                &mut swings,
                &mut popups,
                f64::from(tick) * 16.0,
                &PopupTuning::default(),
            );
        }
        assert!(popups.is_empty());
        assert_eq!(arena.entities[&enemy].health(), 40.0);
    }

    #[test]
    fn enemy_behind_the_player_is_untouched() {
        let mut arena = arena(true);
        let enemy = add_enemy(&mut arena, Vec2::new(-40.0, 0.0));
        let mut swings = vec![start(&mut arena, 0.0).expect("swing")];
        let mut popups = Vec::new();
        for tick in 0..20_u32 {
            tick_swings(
                &mut arena.entities,
                &mut swings,
                &mut popups,
                f64::from(tick) * 16.0,
                &PopupTuning::default(),
            );
        }
        assert_eq!(arena.entities[&enemy].health(), 40.0);
    }

    #[test]
    fn cooldown_and_weapon_kind_gate_swings() {
        let mut arena = arena(true);
        assert!(start(&mut arena, 0.0).is_some());
        assert!(start(&mut arena, 500.0).is_none());
        assert!(start(&mut arena, 900.0).is_some());

        let mut thrower = self::arena(false);
        assert!(start(&mut thrower, 0.0).is_none());
    }

    #[test]
    fn swing_is_dropped_when_owner_dies_or_leaves() {
        let mut arena = arena(true);
        let swing = start(&mut arena, 0.0).expect("swing");
        let mut swings = vec![swing.clone()];
        let mut popups = Vec::new();

        if let Some(p) = arena.entities.get_mut(&arena.player) {
            p.set_health(0.0);
        }
        tick_swings(
            &mut arena.entities,
            &mut swings,
            &mut popups,
            16.0,
            &PopupTuning::default(),
        );
        assert!(swings.is_empty());

        arena.entities.remove(&arena.player);
        let mut swings = vec![swing];
        tick_swings(
            &mut arena.entities,
            &mut swings,
            &mut popups,
            16.0,
            &PopupTuning::default(),
        );
        assert!(swings.is_empty());
    }
}
