//! Progression: items, inventory, rewards, xp, difficulty

pub mod difficulty;
pub mod inventory;
pub mod items;
pub mod rewards;
pub mod xp;

pub use difficulty::Difficulty;
pub use inventory::{AcquireOutcome, Inventory, MAX_SLOTS};
pub use items::{PassiveKind, WeaponKind};
pub use rewards::RewardChoice;
pub use xp::XpState;
