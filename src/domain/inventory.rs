// Inventory, hotbar and equipment slot mutation.

use super::entity::{Entity, PlayerState};
use super::items::{Item, PlayerClass};
use super::progression::recompute_derived_stats;
use super::tuning::ProgressionTuning;

/// A single item location on a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRef {
    Inventory(usize),
    Hotbar(usize),
    Weapon,
    Glyph(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryAction {
    SelectHotbar { index: i64 },
    Swap { from: SlotRef, to: SlotRef },
}

fn slot(player: &PlayerState, slot: SlotRef) -> Option<Option<Item>> {
    match slot {
        SlotRef::Inventory(i) => player.inventory.get(i).copied(),
        SlotRef::Hotbar(i) => player.hotbar.get(i).copied(),
        SlotRef::Weapon => Some(player.weapon),
        SlotRef::Glyph(i) => player.glyphs.get(i).copied(),
    }
}

fn slot_mut(player: &mut PlayerState, slot: SlotRef) -> Option<&mut Option<Item>> {
    match slot {
        SlotRef::Inventory(i) => player.inventory.get_mut(i),
        SlotRef::Hotbar(i) => player.hotbar.get_mut(i),
        SlotRef::Weapon => Some(&mut player.weapon),
        SlotRef::Glyph(i) => player.glyphs.get_mut(i),
    }
}

/// Whether `item` may sit in `slot` for a player of `class`.
///
/// The weapon slot is never empty and only takes class weapons; glyph slots take
/// glyphs or nothing; bags take anything.
pub fn fits(class: PlayerClass, slot: SlotRef, item: Option<&Item>) -> bool {
    match slot {
        SlotRef::Inventory(_) | SlotRef::Hotbar(_) => true,
        SlotRef::Weapon => {
            matches!(item, Some(Item::Weapon(weapon)) if weapon.weapon_class == class)
        }
        SlotRef::Glyph(_) => matches!(item, None | Some(Item::Glyph(_))),
    }
}

/// Exchanges the contents of two slots. Rejected swaps leave both slots untouched.
pub fn swap_items(
    entity: &mut Entity,
    from: SlotRef,
    to: SlotRef,
    tuning: &ProgressionTuning,
) -> bool {
    if from == to {
        return false;
    }
    let Some(player) = entity.as_player_mut() else {
        return false;
    };
    let (Some(source), Some(dest)) = (slot(player, from), slot(player, to)) else {
        return false;
    };
    if source.is_none() {
        return false;
    }
    if !fits(player.class, to, source.as_ref()) || !fits(player.class, from, dest.as_ref()) {
        return false;
    }

    if let Some(cell) = slot_mut(player, from) {
        *cell = dest;
    }
    if let Some(cell) = slot_mut(player, to) {
        *cell = source;
    }

    recompute_derived_stats(entity, tuning);
    true
}

pub fn select_hotbar(player: &mut PlayerState, index: i64) -> bool {
    match usize::try_from(index) {
        Ok(i) if i < player.hotbar.len() => {
            player.selected_hotbar = i;
            true
        }
        _ => false,
    }
}

/// Equips the class weapon from `items` and stows the rest in inventory order.
pub fn stow_starter_kit(entity: &mut Entity, items: Vec<Item>, tuning: &ProgressionTuning) {
    let Some(player) = entity.as_player_mut() else {
        return;
    };

    let class = player.class;
    let mut free_slots = 0..player.inventory.len();
    for item in items {
        if player.weapon.is_none() && fits(class, SlotRef::Weapon, Some(&item)) {
            player.weapon = Some(item);
            continue;
        }
        match free_slots.next() {
            Some(i) => player.inventory[i] = Some(item),
            None => break,
        }
    }

    recompute_derived_stats(entity, tuning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{EntityId, IdAllocator};
    use crate::domain::items::{
        LESSER_DAMAGE, LESSER_HEALTH, PRACTICE_THROWER, TRAINING_BLADE, starter_items,
    };
    use crate::domain::tuning::PlayerTuning;
    use glam::Vec2;

    fn kitted_blade() -> (Entity, IdAllocator) {
        let mut ids = IdAllocator::default();
        let mut p = Entity::new_player(
            ids.entity(),
            Vec2::ZERO,
            PlayerClass::Blade,
            "blade",
            &PlayerTuning::default(),
            100,
        );
        let kit = starter_items(&mut ids);
        stow_starter_kit(&mut p, kit, &ProgressionTuning::default());
        (p, ids)
    }

    fn state(entity: &Entity) -> &PlayerState {
        entity.as_player().expect("player")
    }

    #[test]
    fn starter_kit_equips_class_weapon() {
        let (p, _) = kitted_blade();
        let s = state(&p);
        assert_eq!(s.equipped_weapon().map(|w| w.name), Some(TRAINING_BLADE.name));
        assert_eq!(s.inventory[0].map(|i| i.name()), Some(PRACTICE_THROWER.name));
        assert_eq!(s.inventory.iter().flatten().count(), 4);
        assert!(s.glyphs.iter().all(Option::is_none));
    }

    #[test]
    fn equipping_a_glyph_recomputes_stats() {
        let (mut p, _) = kitted_blade();
        let tuning = ProgressionTuning::default();
        // Inventory order: thrower, damage, speed, health glyph.
        assert!(swap_items(&mut p, SlotRef::Inventory(3), SlotRef::Glyph(0), &tuning));
        assert_eq!(p.max_health(), 110.0);
        assert_eq!(state(&p).inventory[3], None);

        // Unequip back into an empty bag slot.
        assert!(swap_items(&mut p, SlotRef::Glyph(0), SlotRef::Inventory(10), &tuning));
        assert_eq!(p.max_health(), 100.0);
        assert_eq!(state(&p).inventory[10].map(|i| i.name()), Some(LESSER_HEALTH.name));
    }

    #[test]
    fn empty_source_is_rejected() {
        let (mut p, _) = kitted_blade();
        let before = state(&p).clone();
        assert!(!swap_items(
            &mut p,
            SlotRef::Inventory(15),
            SlotRef::Inventory(0),
            &ProgressionTuning::default()
        ));
        let after = state(&p);
        assert_eq!(after.inventory, before.inventory);
    }

    #[test]
    fn identical_or_out_of_range_slots_are_rejected() {
        let (mut p, _) = kitted_blade();
        let tuning = ProgressionTuning::default();
        assert!(!swap_items(&mut p, SlotRef::Inventory(0), SlotRef::Inventory(0), &tuning));
        assert!(!swap_items(&mut p, SlotRef::Inventory(0), SlotRef::Hotbar(99), &tuning));
        assert!(!swap_items(&mut p, SlotRef::Glyph(7), SlotRef::Inventory(0), &tuning));
    }

    #[test]
    fn weapon_slot_only_takes_matching_class() {
        let (mut p, mut ids) = kitted_blade();
        let tuning = ProgressionTuning::default();

        // Thrower weapon into a blade's weapon slot.
        assert!(!swap_items(&mut p, SlotRef::Inventory(0), SlotRef::Weapon, &tuning));
        // Glyph into the weapon slot.
        assert!(!swap_items(&mut p, SlotRef::Inventory(1), SlotRef::Weapon, &tuning));
        // Moving the weapon out would leave the slot empty.
        assert!(!swap_items(&mut p, SlotRef::Weapon, SlotRef::Inventory(12), &tuning));

        // A second blade can replace the first.
        let spare = TRAINING_BLADE.create(ids.item());
        if let Some(s) = p.as_player_mut() {
            s.hotbar[2] = Some(spare);
        }
        assert!(swap_items(&mut p, SlotRef::Hotbar(2), SlotRef::Weapon, &tuning));
        assert_eq!(state(&p).weapon.map(|i| i.id()), Some(spare.id()));
    }

    #[test]
    fn glyph_slot_rejects_weapons_and_swap_back_must_fit() {
        let (mut p, mut ids) = kitted_blade();
        let tuning = ProgressionTuning::default();
        assert!(!swap_items(&mut p, SlotRef::Inventory(0), SlotRef::Glyph(0), &tuning));

        // Glyph slot holds a glyph; swapping a weapon into it from the bag must fail both ways.
        if let Some(s) = p.as_player_mut() {
            s.glyphs[1] = Some(LESSER_DAMAGE.create(ids.item()));
        }
        assert!(!swap_items(&mut p, SlotRef::Glyph(1), SlotRef::Inventory(0), &tuning));
        assert!(state(&p).glyphs[1].is_some());
    }

    #[test]
    fn hotbar_selection_is_bounds_checked() {
        let (mut p, _) = kitted_blade();
        let s = p.as_player_mut().expect("player");
        assert!(select_hotbar(s, 4));
        assert_eq!(s.selected_hotbar, 4);
        assert!(!select_hotbar(s, 5));
        assert!(!select_hotbar(s, -1));
        assert_eq!(s.selected_hotbar, 4);
    }
}
