//! Semantic event channel
//!
//! Everything a front end needs to react to, with no rendering detail.
//! The queue fills during [`Game::advance`](crate::game::Game::advance)
//! and the embedder drains it once per tick.

use serde::Serialize;

use crate::progression::rewards::RewardChoice;
use crate::world::spatial::Position;

/// Outbound only, hence no `Deserialize`: the sim produces events, it
/// never consumes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A player stepped into the boss lair; doors slam shut.
    BossStirred { name: &'static str },
    /// The spawn countdown finished.
    BossAppeared { name: &'static str },
    BossDefeated { name: &'static str },
    /// The exit portal materialized.
    PortalSpawned { at: Position },
    FloorAdvanced { floor: u32 },
    Victory,
    GameOver,

    LevelUp { level: u32 },
    /// A three-way choice is waiting; the sim is frozen until
    /// [`Game::choose_reward`](crate::game::Game::choose_reward).
    RewardsOffered { choices: Vec<RewardChoice> },
    ItemAcquired { choice: RewardChoice },
    ItemUpgraded { choice: RewardChoice, stack: u32 },
    /// A new item was chosen with no free slot; nothing changed.
    InventoryFull { choice: RewardChoice },
    /// Lean Diet finished shedding and removed itself.
    DietComplete,

    CreatureHurt { damage: f32 },
    DevourUsed { healed: f32 },
    EnemyKilled { at: Position },
    WallDestroyed { at: Position },
    CrateDestroyed { at: Position },
    ChestDropped { at: Position },
    LightningChained { from: Position },
    Explosion { at: Position, radius: f32 },
}
