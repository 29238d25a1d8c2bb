// Item catalog: weapon and glyph archetypes and starter-kit creation.
//
// Items are immutable once created; only the slot holding them changes.

use super::ids::{IdAllocator, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerClass {
    Blade,
    Thrower,
}

impl PlayerClass {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerClass::Blade => "blade",
            PlayerClass::Thrower => "thrower",
        }
    }

    /// The attack kind this class's weapons use.
    pub fn attack_kind(self) -> AttackKind {
        match self {
            PlayerClass::Blade => AttackKind::Melee,
            PlayerClass::Thrower => AttackKind::Throw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackKind {
    Melee,
    Throw,
}

impl AttackKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttackKind::Melee => "melee",
            AttackKind::Throw => "throw",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphStat {
    Damage,
    Speed,
    Health,
}

impl GlyphStat {
    pub fn as_str(self) -> &'static str {
        match self {
            GlyphStat::Damage => "damage",
            GlyphStat::Speed => "speed",
            GlyphStat::Health => "health",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub id: ItemId,
    pub name: &'static str,
    pub weapon_class: PlayerClass,
    pub attack_kind: AttackKind,
    pub damage: f32,
    pub cooldown_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub id: ItemId,
    pub name: &'static str,
    pub stat: GlyphStat,
    /// Fractional bonus, e.g. `0.1` for +10%.
    pub percent_boost: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item {
    Weapon(Weapon),
    Glyph(Glyph),
}

impl Item {
    pub fn id(&self) -> ItemId {
        match self {
            Item::Weapon(w) => w.id,
            Item::Glyph(g) => g.id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Item::Weapon(w) => w.name,
            Item::Glyph(g) => g.name,
        }
    }

    pub fn as_weapon(&self) -> Option<&Weapon> {
        match self {
            Item::Weapon(w) => Some(w),
            Item::Glyph(_) => None,
        }
    }

    pub fn as_glyph(&self) -> Option<&Glyph> {
        match self {
            Item::Glyph(g) => Some(g),
            Item::Weapon(_) => None,
        }
    }
}

/// Static template a weapon item is stamped from.
#[derive(Debug, Clone, Copy)]
pub struct WeaponArchetype {
    pub key: &'static str,
    pub name: &'static str,
    pub weapon_class: PlayerClass,
    pub attack_kind: AttackKind,
    pub damage: f32,
    pub cooldown_ms: f64,
}

impl WeaponArchetype {
    pub fn create(&self, id: ItemId) -> Item {
        Item::Weapon(Weapon {
            id,
            name: self.name,
            weapon_class: self.weapon_class,
            attack_kind: self.attack_kind,
            damage: self.damage,
            cooldown_ms: self.cooldown_ms,
        })
    }
}

/// Static template a glyph item is stamped from.
#[derive(Debug, Clone, Copy)]
pub struct GlyphArchetype {
    pub key: &'static str,
    pub name: &'static str,
    pub stat: GlyphStat,
    pub percent_boost: f32,
}

impl GlyphArchetype {
    pub fn create(&self, id: ItemId) -> Item {
        Item::Glyph(Glyph {
            id,
            name: self.name,
            stat: self.stat,
            percent_boost: self.percent_boost,
        })
    }
}

pub const TRAINING_BLADE: WeaponArchetype = WeaponArchetype {
    key: "TRAINING_BLADE",
    name: "Training Blade",
    weapon_class: PlayerClass::Blade,
    attack_kind: AttackKind::Melee,
    damage: 20.0,
    cooldown_ms: 900.0,
};

pub const PRACTICE_THROWER: WeaponArchetype = WeaponArchetype {
    key: "PRACTICE_THROWER",
    name: "Practice Thrower",
    weapon_class: PlayerClass::Thrower,
    attack_kind: AttackKind::Throw,
    damage: 16.0,
    cooldown_ms: 350.0,
};

pub const LESSER_DAMAGE: GlyphArchetype = GlyphArchetype {
    key: "LESSER_DAMAGE",
    name: "Lesser Damage Glyph",
    stat: GlyphStat::Damage,
    percent_boost: 0.1,
};

pub const LESSER_SPEED: GlyphArchetype = GlyphArchetype {
    key: "LESSER_SPEED",
    name: "Lesser Speed Glyph",
    stat: GlyphStat::Speed,
    percent_boost: 0.1,
};

pub const LESSER_HEALTH: GlyphArchetype = GlyphArchetype {
    key: "LESSER_HEALTH",
    name: "Lesser Health Glyph",
    stat: GlyphStat::Health,
    percent_boost: 0.1,
};

pub const WEAPON_ARCHETYPES: [WeaponArchetype; 2] = [TRAINING_BLADE, PRACTICE_THROWER];
pub const GLYPH_ARCHETYPES: [GlyphArchetype; 3] = [LESSER_DAMAGE, LESSER_SPEED, LESSER_HEALTH];

/// One of every weapon followed by one of every glyph, in catalog order.
pub fn starter_items(ids: &mut IdAllocator) -> Vec<Item> {
    let mut items: Vec<Item> = WEAPON_ARCHETYPES
        .iter()
        .map(|archetype| archetype.create(ids.item()))
        .collect();
    items.extend(
        GLYPH_ARCHETYPES
            .iter()
            .map(|archetype| archetype.create(ids.item())),
    );
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn starter_kit_has_every_archetype_with_unique_ids() {
        let mut ids = IdAllocator::default();
        let items = starter_items(&mut ids);

        assert_eq!(items.len(), 5);
        assert_eq!(items[0].name(), "Training Blade");
        assert_eq!(items[1].name(), "Practice Thrower");
        assert!(items[2..].iter().all(|item| item.as_glyph().is_some()));

        let unique: HashSet<_> = items.iter().map(Item::id).collect();
        assert_eq!(unique.len(), items.len());
    }

    #[test]
    fn class_maps_to_attack_kind() {
        assert_eq!(PlayerClass::Blade.attack_kind(), AttackKind::Melee);
        assert_eq!(PlayerClass::Thrower.attack_kind(), AttackKind::Throw);
        assert_eq!(TRAINING_BLADE.attack_kind, PlayerClass::Blade.attack_kind());
    }
}
