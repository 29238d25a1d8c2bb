use glam::Vec2;
use realm_server::domain::entity::Behavior;
use realm_server::domain::progression::grant_exp;
use realm_server::domain::{
    EnemySpawn, Entity, EntityId, InventoryAction, LevelData, PlayerClass, PlayerInput, SlotRef,
    World, WorldTuning,
};

const DT: f32 = 1.0 / 60.0;

fn world_with(enemies: &[(Vec2, u32)]) -> World {
    let level = LevelData {
        player_spawn: Vec2::ZERO,
        enemy_spawns: enemies
            .iter()
            .map(|(pos, level)| EnemySpawn {
                pos: *pos,
                name: "Slime".to_string(),
                level: *level,
            })
            .collect(),
    };
    World::new(&level, WorldTuning::default())
}

fn enemy_ids(world: &World) -> Vec<EntityId> {
    world
        .entities()
        .filter(|e| e.is_enemy())
        .map(|e| e.id)
        .collect()
}

fn input(seq: i64) -> PlayerInput {
    PlayerInput {
        seq,
        ..PlayerInput::default()
    }
}

#[test]
fn only_the_newest_input_sequence_is_applied() {
    let mut world = world_with(&[]);
    let (pid, _) = world.add_player("mover");

    assert!(world.apply_input(pid, &PlayerInput { right: true, ..input(5) }));
    assert!(!world.apply_input(pid, &PlayerInput { left: true, ..input(3) }));
    assert!(!world.apply_input(pid, &PlayerInput { left: true, ..input(5) }));

    world.step(DT);
    let p = world.entity(pid).expect("player");
    assert!(p.pos.x > 0.0);
    assert_eq!(p.as_player().map(|s| s.last_input_seq), Some(5));
}

#[test]
fn health_stays_within_bounds_in_a_brawl() {
    let mut world = world_with(&[
        (Vec2::new(30.0, 0.0), 11),
        (Vec2::new(-30.0, 0.0), 11),
        (Vec2::new(0.0, 30.0), 5),
    ]);
    let (blade, _) = world.add_player("blade");
    let (thrower, _) = world.add_player("thrower");

    for seq in 1..=600 {
        for pid in [blade, thrower] {
            world.apply_input(
                pid,
                &PlayerInput {
                    attack_melee: true,
                    attack_throw: true,
                    aim: seq as f32 * 0.1,
                    ..input(seq)
                },
            );
        }
        world.step(DT);
        for e in world.entities() {
            assert!(e.health() >= 0.0 && e.health() <= e.max_health(), "{e:?}");
        }
    }
}

#[test]
fn melee_swing_hits_an_enemy_in_front_exactly_once() {
    let mut world = world_with(&[(Vec2::new(40.0, 0.0), 1)]);
    let (pid, class) = world.add_player("blade");
    assert_eq!(class, PlayerClass::Blade);
    let eid = enemy_ids(&world)[0];

    world.apply_input(
        pid,
        &PlayerInput {
            aim: 0.0,
            attack_melee: true,
            ..input(1)
        },
    );
    for _ in 0..20 {
        world.step(DT);
    }

    assert_eq!(world.entity(eid).map(Entity::health), Some(20.0));
    assert!(world.snapshot().swings.is_empty());
}

#[test]
fn one_grant_can_cross_two_levels() {
    let mut world = world_with(&[]);
    let (pid, _) = world.add_player("grinder");
    let tuning = world.tuning().progression;

    let player = world
        .entity_mut(pid)
        .and_then(Entity::as_player_mut)
        .expect("player");
    assert_eq!(grant_exp(player, 227, &tuning), 2);
    assert_eq!(player.level, 3);
    assert_eq!(player.skill_points, 2);
    assert_eq!(player.exp, 5);
    assert_eq!(player.exp_to_next, 148);
}

#[test]
fn swap_from_an_empty_slot_changes_nothing() {
    let mut world = world_with(&[]);
    let (pid, _) = world.add_player("packer");
    let before = world
        .entity(pid)
        .and_then(Entity::as_player)
        .map(|p| (p.hotbar[0], p.inventory[0]))
        .expect("player");

    let swap = InventoryAction::Swap {
        from: SlotRef::Hotbar(0),
        to: SlotRef::Inventory(0),
    };
    assert!(!world.apply_inventory_action(pid, swap));

    let after = world
        .entity(pid)
        .and_then(Entity::as_player)
        .map(|p| (p.hotbar[0], p.inventory[0]))
        .expect("player");
    assert_eq!(before, after);
}

#[test]
fn health_point_raises_max_health_without_healing() {
    let mut world = world_with(&[]);
    let (pid, _) = world.add_player("tank");
    assert_eq!(world.entity(pid).map(Entity::max_health), Some(100.0));

    assert!(!world.upgrade_skill(pid, "health"));
    if let Some(p) = world.entity_mut(pid).and_then(Entity::as_player_mut) {
        p.skill_points = 1;
    }
    assert!(!world.upgrade_skill(pid, "luck"));
    assert!(world.upgrade_skill(pid, "health"));

    let p = world.entity(pid).expect("player");
    assert_eq!(p.max_health(), 120.0);
    assert_eq!(p.health(), 100.0);
}

#[test]
fn enemy_stats_scale_with_level() {
    let world = world_with(&[(Vec2::new(0.0, 500.0), 1), (Vec2::new(0.0, -500.0), 11)]);
    let mut stats: Vec<(u32, f32, u32)> = world
        .entities()
        .filter_map(|e| e.as_enemy().map(|en| (en.level, e.max_health(), en.exp_reward)))
        .collect();
    stats.sort_by_key(|s| s.0);
    assert_eq!(stats, vec![(1, 40.0, 45), (11, 80.0, 90)]);
}

#[test]
fn only_the_killer_earns_exp() {
    let mut world = world_with(&[(Vec2::new(600.0, 0.0), 1)]);
    let (a, _) = world.add_player("a");
    let (b, _) = world.add_player("b");
    let eid = enemy_ids(&world)[0];

    if let Some(e) = world.entity_mut(eid) {
        e.apply_damage(10.0, b);
        e.apply_damage(1000.0, a);
    }
    world.step(DT);

    let exp = |id| world.entity(id).and_then(Entity::as_player).map(|p| p.exp);
    assert_eq!(exp(a), Some(45));
    assert_eq!(exp(b), Some(0));
    assert!(world.entity(eid).is_none());
}

#[test]
fn dead_player_waits_for_respawn_then_returns_to_spawn() {
    let mut world = world_with(&[]);
    let (pid, _) = world.add_player("unlucky");
    if let Some(p) = world.entity_mut(pid) {
        p.pos = Vec2::new(50.0, 50.0);
        p.set_health(0.0);
    }

    world.step(DT);
    world.apply_input(pid, &PlayerInput { right: true, ..input(1) });
    for _ in 0..100 {
        world.step(DT);
    }
    let p = world.entity(pid).expect("player");
    assert_eq!(p.health(), 0.0);
    assert_eq!(p.pos, Vec2::new(50.0, 50.0));

    for _ in 0..100 {
        world.step(DT);
    }
    let p = world.entity(pid).expect("player");
    assert_eq!(p.health(), p.max_health());
    assert_eq!(p.pos, Vec2::ZERO);
}

#[test]
fn enemy_keeps_chasing_far_from_spawn_while_target_is_in_range() {
    let mut world = world_with(&[(Vec2::ZERO, 1)]);
    let eid = enemy_ids(&world)[0];
    let (pid, _) = world.add_player("kiter");

    // Keep the bait just inside aggro range ahead of the enemy.
    for _ in 0..400 {
        let enemy_x = world.entity(eid).map(|e| e.pos.x).expect("enemy");
        if let Some(p) = world.entity_mut(pid) {
            p.pos = Vec2::new(enemy_x + 200.0, 0.0);
        }
        world.step(DT);

        let e = world.entity(eid).expect("enemy");
        let enemy = e.as_enemy().expect("enemy state");
        assert_eq!(enemy.behavior, Behavior::Chasing);
        assert_eq!(enemy.target, Some(pid));
    }

    let e = world.entity(eid).expect("enemy");
    assert!(e.pos.x > 300.0);
}
