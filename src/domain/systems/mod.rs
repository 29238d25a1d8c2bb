// Per-tick simulation systems. Each operates on world-owned collections passed in explicitly.

pub mod contact;
pub mod enemy_ai;
pub mod melee;
pub mod movement;
pub mod projectiles;
