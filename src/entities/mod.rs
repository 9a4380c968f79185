//! Entity definitions: creatures, walkers, bosses, pickups

pub mod boss;
pub mod creature;
pub mod enemy;
pub mod pickups;

pub use boss::{Boss, BossPhase, DashStage};
pub use creature::{CharacterKind, Creature};
pub use enemy::Enemy;
pub use pickups::{Chest, Food, FoodKind};
