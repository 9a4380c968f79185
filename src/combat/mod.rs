//! Combat: projectiles, hit resolution, status effects

pub mod projectile;
pub mod status;

pub use projectile::{CombatGains, CombatStats, Projectile};
pub use status::StatusTimers;
