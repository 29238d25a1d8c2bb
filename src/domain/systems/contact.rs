// Enemy body contact against players, gated by a per-player i-frame window.

use crate::domain::effects::Popup;
use crate::domain::entity::Entity;
use crate::domain::ids::EntityId;
use crate::domain::tuning::{PlayerTuning, PopupTuning};
use glam::Vec2;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Toucher {
    id: EntityId,
    pos: Vec2,
    radius: f32,
    damage: f32,
}

pub fn resolve_contact_damage(
    entities: &mut BTreeMap<EntityId, Entity>,
    popups: &mut Vec<Popup>,
    now: f64,
    player_tuning: &PlayerTuning,
    popup_tuning: &PopupTuning,
) {
    let touchers: Vec<Toucher> = entities
        .values()
        .filter(|e| e.is_alive())
        .filter_map(|e| {
            e.as_enemy().map(|enemy| Toucher {
                id: e.id,
                pos: e.pos,
                radius: e.radius,
                damage: enemy.contact_damage,
            })
        })
        .collect();
    if touchers.is_empty() {
        return;
    }

    for player in entities.values_mut() {
        if !player.is_player() || !player.is_alive() {
            continue;
        }

        for t in &touchers {
            let last_damage_at = match player.as_player() {
                Some(p) => p.last_damage_at,
                None => break,
            };
            if now - last_damage_at < player_tuning.contact_iframes_ms {
                break;
            }

            let reach = player.radius + t.radius;
            if player.pos.distance_squared(t.pos) > reach * reach {
                continue;
            }

            let dealt = player.apply_damage(t.damage, t.id);
            if let Some(p) = player.as_player_mut() {
                p.last_damage_at = now;
            }
            popups.push(Popup::new(
                player.id,
                dealt,
                player.pos,
                now,
                popup_tuning.damage_lifetime_ms,
            ));
            debug!(
                player_id = %player.id,
                enemy_id = %t.id,
                hp = player.health(),
                "contact damage"
            );
            if !player.is_alive() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::items::PlayerClass;
    use crate::domain::level::EnemySpawn;
    use crate::domain::tuning::EnemyTuning;

    fn arena(enemy_positions: &[Vec2]) -> (BTreeMap<EntityId, Entity>, EntityId) {
        let mut entities = BTreeMap::new();
        let player = Entity::new_player(
            EntityId(1),
            Vec2::ZERO,
            PlayerClass::Blade,
            "victim",
            &PlayerTuning::default(),
            100,
        );
        entities.insert(player.id, player);
        for (i, pos) in enemy_positions.iter().enumerate() {
            let spawn = EnemySpawn {
                pos: *pos,
                name: "Biter".to_string(),
                level: 1,
            };
            let id = EntityId(10 + i as u64);
            entities.insert(id, Entity::new_enemy(id, &spawn, &EnemyTuning::default()));
        }
        (entities, EntityId(1))
    }

    fn touch(entities: &mut BTreeMap<EntityId, Entity>, now: f64) -> Vec<Popup> {
        let mut popups = Vec::new();
        resolve_contact_damage(
            entities,
            &mut popups,
            now,
            &PlayerTuning::default(),
            &PopupTuning::default(),
        );
        popups
    }

    #[test]
    fn overlapping_enemy_hurts_then_iframes_protect() {
        let (mut entities, pid) = arena(&[Vec2::new(20.0, 0.0)]);

        assert_eq!(touch(&mut entities, 0.0).len(), 1);
        assert_eq!(entities[&pid].health(), 90.0);
        assert_eq!(entities[&pid].last_hit_by, Some(EntityId(10)));

        assert!(touch(&mut entities, 599.0).is_empty());
        assert_eq!(entities[&pid].health(), 90.0);

        assert_eq!(touch(&mut entities, 600.0).len(), 1);
        assert_eq!(entities[&pid].health(), 80.0);
    }

    #[test]
    fn iframes_are_shared_across_enemies() {
        let (mut entities, pid) = arena(&[Vec2::new(20.0, 0.0), Vec2::new(-20.0, 0.0)]);
        touch(&mut entities, 0.0);
        assert_eq!(entities[&pid].health(), 90.0);
    }

    #[test]
    fn distant_and_dead_enemies_do_nothing() {
        let (mut entities, pid) = arena(&[Vec2::new(35.0, 0.0), Vec2::new(0.0, 10.0)]);
        if let Some(e) = entities.get_mut(&EntityId(11)) {
            e.set_health(0.0);
        }
        assert!(touch(&mut entities, 0.0).is_empty());
        assert_eq!(entities[&pid].health(), 100.0);
    }
}
