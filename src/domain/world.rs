// The authoritative world: owns every entity and transient effect and advances
// them on a fixed timestep.

use super::effects::{EnemyRespawn, MeleeSwing, PlayerRespawn, Popup, Projectile};
use super::entity::{Entity, PlayerInput};
use super::ids::{EntityId, IdAllocator};
use super::inventory::{self, InventoryAction};
use super::items::{PlayerClass, starter_items};
use super::level::{EnemySpawn, LevelData};
use super::progression::{allocate_skill_point, grant_exp};
use super::snapshot::{EntitySnapshot, ProjectileSnapshot, SwingSnapshot, WorldSnapshot};
use super::systems::contact::resolve_contact_damage;
use super::systems::enemy_ai::{Target, step_enemy};
use super::systems::melee::{tick_swings, try_start_swing};
use super::systems::movement::step_player;
use super::systems::projectiles::{tick_projectiles, try_throw};
use super::tuning::WorldTuning;
use glam::Vec2;
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug)]
pub struct World {
    tuning: WorldTuning,
    ids: IdAllocator,

    // Simulation clock in milliseconds; advanced by each step.
    now_ms: f64,
    tick: u64,

    player_spawn: Vec2,
    joins: u64,

    entities: BTreeMap<EntityId, Entity>,
    swings: Vec<MeleeSwing>,
    projectiles: Vec<Projectile>,
    enemy_respawns: Vec<EnemyRespawn>,
    player_respawns: Vec<PlayerRespawn>,
    exp_popups: Vec<Popup>,
    damage_popups: Vec<Popup>,
}

impl World {
    pub fn new(level: &LevelData, tuning: WorldTuning) -> Self {
        let mut world = Self {
            tuning,
            ids: IdAllocator::default(),
            now_ms: 0.0,
            tick: 0,
            player_spawn: level.player_spawn,
            joins: 0,
            entities: BTreeMap::new(),
            swings: Vec::new(),
            projectiles: Vec::new(),
            enemy_respawns: Vec::new(),
            player_respawns: Vec::new(),
            exp_popups: Vec::new(),
            damage_popups: Vec::new(),
        };

        for spawn in &level.enemy_spawns {
            world.spawn_enemy(spawn);
        }
        world
    }

    pub fn tuning(&self) -> &WorldTuning {
        &self.tuning
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn player_spawn(&self) -> Vec2 {
        self.player_spawn
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn player_count(&self) -> usize {
        self.entities.values().filter(|e| e.is_player()).count()
    }

    pub fn spawn_enemy(&mut self, spawn: &EnemySpawn) -> EntityId {
        let id = self.ids.entity();
        self.entities
            .insert(id, Entity::new_enemy(id, spawn, &self.tuning.enemy));
        id
    }

    /// Adds a player with the next class in the blade/thrower rotation.
    pub fn add_player(&mut self, name: &str) -> (EntityId, PlayerClass) {
        let class = if self.joins % 2 == 0 {
            PlayerClass::Blade
        } else {
            PlayerClass::Thrower
        };
        self.joins += 1;
        (self.add_player_with_class(name, class), class)
    }

    pub fn add_player_with_class(&mut self, name: &str, class: PlayerClass) -> EntityId {
        let id = self.ids.entity();
        let progression = self.tuning.progression;
        let mut player = Entity::new_player(
            id,
            self.player_spawn,
            class,
            name,
            &self.tuning.player,
            progression.exp_to_next(1),
        );
        let kit = starter_items(&mut self.ids);
        inventory::stow_starter_kit(&mut player, kit, &progression);

        info!(player_id = %id, class = class.as_str(), "player spawned");
        self.entities.insert(id, player);
        id
    }

    /// Removes a player and any respawn ticket it holds. Effects it owned are
    /// dropped on the next step.
    pub fn remove_player(&mut self, id: EntityId) -> bool {
        if !self.entities.get(&id).is_some_and(Entity::is_player) {
            return false;
        }
        self.entities.remove(&id);
        self.player_respawns.retain(|r| r.id != id);
        info!(player_id = %id, "player removed");
        true
    }

    pub fn apply_input(&mut self, id: EntityId, input: &PlayerInput) -> bool {
        match self.entities.get_mut(&id).and_then(Entity::as_player_mut) {
            Some(player) => player.apply_input(input),
            None => false,
        }
    }

    pub fn upgrade_skill(&mut self, id: EntityId, stat: &str) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        let ok = allocate_skill_point(entity, stat, &self.tuning.progression);
        if !ok {
            debug!(player_id = %id, stat, "skill upgrade rejected");
        }
        ok
    }

    pub fn apply_inventory_action(&mut self, id: EntityId, action: InventoryAction) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        let ok = match action {
            InventoryAction::SelectHotbar { index } => entity
                .as_player_mut()
                .is_some_and(|p| inventory::select_hotbar(p, index)),
            InventoryAction::Swap { from, to } => {
                inventory::swap_items(entity, from, to, &self.tuning.progression)
            }
        };
        if !ok {
            debug!(player_id = %id, ?action, "inventory action rejected");
        }
        ok
    }

    /// Advances the world by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.now_ms += f64::from(dt) * 1000.0;
        self.tick += 1;
        let now = self.now_ms;

        self.step_entities(dt);
        self.queue_attacks(now);

        tick_swings(
            &mut self.entities,
            &mut self.swings,
            &mut self.damage_popups,
            now,
            &self.tuning.popups,
        );
        tick_projectiles(
            &mut self.entities,
            &mut self.projectiles,
            &mut self.damage_popups,
            dt,
            now,
            &self.tuning.popups,
        );

        self.process_enemy_deaths(now);
        self.fire_enemy_respawns(now);
        self.queue_player_respawns(now);
        self.fire_player_respawns(now);

        resolve_contact_damage(
            &mut self.entities,
            &mut self.damage_popups,
            now,
            &self.tuning.player,
            &self.tuning.popups,
        );

        self.exp_popups.retain(|p| p.is_live(now));
        self.damage_popups.retain(|p| p.is_live(now));
    }

    fn step_entities(&mut self, dt: f32) {
        let targets: Vec<Target> = self
            .entities
            .values()
            .filter(|e| e.is_player() && e.is_alive())
            .map(|e| Target { id: e.id, pos: e.pos })
            .collect();

        for e in self.entities.values_mut() {
            if e.is_player() {
                step_player(e, dt);
            } else {
                step_enemy(e, &targets, dt);
            }
        }
    }

    fn queue_attacks(&mut self, now: f64) {
        for e in self.entities.values_mut() {
            if !e.is_alive() {
                continue;
            }
            let Some(player) = e.as_player_mut() else {
                continue;
            };
            let melee = std::mem::take(&mut player.pending_melee);
            let throw = std::mem::take(&mut player.pending_throw);

            if melee
                && let Some(swing) = try_start_swing(e, now, &mut self.ids, &self.tuning.melee)
            {
                self.swings.push(swing);
            }
            if throw
                && let Some(projectile) = try_throw(e, now, &mut self.ids, &self.tuning.projectile)
            {
                self.projectiles.push(projectile);
            }
        }
    }

    fn process_enemy_deaths(&mut self, now: f64) {
        let dead: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.is_enemy() && !e.is_alive())
            .map(|e| e.id)
            .collect();

        for id in dead {
            let Some(corpse) = self.entities.remove(&id) else {
                continue;
            };
            let Some(enemy) = corpse.as_enemy() else {
                continue;
            };

            if let Some(killer_id) = corpse.last_hit_by {
                self.credit_kill(killer_id, enemy.exp_reward, now);
            }

            info!(
                enemy_id = %id,
                killer_id = ?corpse.last_hit_by.map(|k| k.0),
                level = enemy.level,
                "enemy killed"
            );
            self.enemy_respawns.push(EnemyRespawn {
                id,
                spawn: EnemySpawn {
                    pos: enemy.spawn,
                    name: enemy.name.clone(),
                    level: enemy.level,
                },
                fire_at: now + enemy.respawn_delay_ms,
            });
        }
    }

    fn credit_kill(&mut self, killer_id: EntityId, exp: u32, now: f64) {
        let Some(killer) = self.entities.get_mut(&killer_id) else {
            return;
        };
        let pos = killer.pos;
        let Some(player) = killer.as_player_mut() else {
            return;
        };

        let gained = grant_exp(player, exp, &self.tuning.progression);
        self.exp_popups.push(Popup::new(
            killer_id,
            exp as f32,
            pos,
            now,
            self.tuning.popups.exp_lifetime_ms,
        ));
        if gained > 0 {
            info!(
                player_id = %killer_id,
                level = player.level,
                skill_points = player.skill_points,
                "player leveled up"
            );
        }
    }

    fn fire_enemy_respawns(&mut self, now: f64) {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.enemy_respawns)
            .into_iter()
            .partition(|r| r.fire_at <= now);
        self.enemy_respawns = pending;

        for r in due {
            let enemy = Entity::new_enemy(r.id, &r.spawn, &self.tuning.enemy);
            info!(enemy_id = %r.id, name = %r.spawn.name, "enemy respawned");
            self.entities.insert(r.id, enemy);
        }
    }

    fn queue_player_respawns(&mut self, now: f64) {
        let delay = self.tuning.player.respawn_delay_ms;
        for e in self.entities.values_mut() {
            if e.is_alive() {
                continue;
            }
            let id = e.id;
            let Some(player) = e.as_player_mut() else {
                continue;
            };
            if player.awaiting_respawn {
                continue;
            }

            player.awaiting_respawn = true;
            player.clear_transient_input();
            self.player_respawns.push(PlayerRespawn {
                id,
                fire_at: now + delay,
            });
            info!(player_id = %id, "player died");
        }
    }

    fn fire_player_respawns(&mut self, now: f64) {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.player_respawns)
            .into_iter()
            .partition(|r| r.fire_at <= now);
        self.player_respawns = pending;

        for r in due {
            let Some(e) = self.entities.get_mut(&r.id) else {
                continue;
            };
            let Some(player) = e.as_player_mut() else {
                continue;
            };
            player.awaiting_respawn = false;
            player.clear_transient_input();
            let spawn = player.spawn;

            e.heal_full();
            e.pos = spawn;
            info!(player_id = %r.id, "player respawned");
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let now = self.now_ms;
        WorldSnapshot {
            tick: self.tick,
            time_ms: now,
            entities: self
                .entities
                .iter()
                .map(|(id, e)| (*id, EntitySnapshot::from(e)))
                .collect(),
            projectiles: self.projectiles.iter().map(ProjectileSnapshot::from).collect(),
            swings: self
                .swings
                .iter()
                .filter_map(|swing| {
                    let owner = self.entities.get(&swing.owner)?;
                    Some(SwingSnapshot::capture(swing, owner, now))
                })
                .collect(),
            exp_popups: self
                .exp_popups
                .iter()
                .filter(|p| p.is_live(now))
                .copied()
                .collect(),
            damage_popups: self
                .damage_popups
                .iter()
                .filter(|p| p.is_live(now))
                .copied()
                .collect(),
        }
    }
}
