//! Read-only view of one tick
//!
//! Front ends render from a [`Snapshot`] instead of reaching into
//! `Game` fields. The snapshot borrows the live state, so taking one is
//! free; the [`Hud`] scalars are copied out for convenience.

use crate::entities::boss::Boss;
use crate::entities::creature::Creature;
use crate::entities::enemy::Enemy;
use crate::entities::pickups::{Chest, Food};
use crate::combat::projectile::Projectile;
use crate::game::state::{Game, RunPhase};
use crate::progression::inventory::Inventory;
use crate::progression::rewards::RewardChoice;
use crate::world::rooms::RoomGraph;
use crate::world::spatial::{CrateGrid, Position, WallGrid};

/// Scalar overlay values, copied per snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub hp: f32,
    pub max_hp: f32,
    pub level: u32,
    pub xp: f32,
    pub xp_to_next: u32,
    pub score: u32,
    pub floor: u32,
    /// Remaining devour cooldown in ticks; zero means ready.
    pub devour_cooldown: f32,
    /// Remaining damage-immunity ticks.
    pub invincible: u32,
}

/// Everything a renderer needs for one frame.
pub struct Snapshot<'a> {
    pub tick: u64,
    pub phase: RunPhase,
    pub paused: bool,
    pub hud: Hud,
    pub creatures: &'a [Creature],
    pub graph: &'a RoomGraph,
    pub walls: &'a WallGrid,
    pub crates: &'a CrateGrid,
    pub food: &'a [Food],
    pub chests: &'a [Chest],
    pub enemies: &'a [Enemy],
    pub projectiles: &'a [Projectile],
    pub boss: &'a Boss,
    pub exit_portal: Option<Position>,
    pub inventory: &'a Inventory,
    /// Non-empty exactly while the phase is `ChoosingReward`.
    pub pending_rewards: &'a [RewardChoice],
}

impl Game {
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            tick: self.tick,
            phase: self.phase(),
            paused: self.paused,
            hud: Hud {
                hp: self.hp,
                max_hp: self.max_hp,
                level: self.xp.level,
                xp: self.xp.xp,
                xp_to_next: self.xp.to_next,
                score: self.score,
                floor: self.floor,
                devour_cooldown: self.devour_timer.max(0.0),
                invincible: self.invincible,
            },
            creatures: &self.creatures,
            graph: &self.world.graph,
            walls: &self.world.walls,
            crates: &self.world.crates,
            food: &self.world.food,
            chests: &self.world.chests,
            enemies: &self.world.enemies,
            projectiles: &self.world.projectiles,
            boss: &self.world.boss,
            exit_portal: self.world.exit_portal,
            inventory: &self.inventory,
            pending_rewards: self.pending_rewards(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::creature::CharacterKind;
    use crate::game::state::GameSettings;
    use crate::progression::difficulty::Difficulty;

    #[test]
    fn test_snapshot_mirrors_state() {
        let game = Game::new(GameSettings {
            difficulty: Difficulty::Normal,
            characters: vec![CharacterKind::Frost],
            seed: Some(7),
        });
        let snap = game.snapshot();
        assert_eq!(snap.phase, RunPhase::Running);
        assert_eq!(snap.hud.hp, game.hp);
        assert_eq!(snap.hud.floor, 1);
        assert_eq!(snap.hud.level, 1);
        assert_eq!(snap.creatures.len(), 1);
        assert_eq!(snap.graph.len(), game.world.graph.len());
        assert!(snap.pending_rewards.is_empty());
        assert_eq!(snap.exit_portal, None);
    }
}
