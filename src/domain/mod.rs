// Domain layer: core simulation types and rules.

pub mod effects;
pub mod entity;
pub mod ids;
pub mod inventory;
pub mod items;
pub mod level;
pub mod progression;
pub mod snapshot;
pub mod systems;
pub mod tuning;
pub mod world;

pub use entity::{Entity, PlayerInput};
pub use ids::EntityId;
pub use inventory::{InventoryAction, SlotRef};
pub use items::{Item, PlayerClass};
pub use level::{EnemySpawn, LevelData, LevelError, LevelSource};
pub use snapshot::WorldSnapshot;
pub use tuning::WorldTuning;
pub use world::World;
