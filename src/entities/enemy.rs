//! Walker enemies
//!
//! Roaming creatures that shamble toward the nearest player head once it
//! comes within their detection range. Later floors make them bigger,
//! tougher, or both.

use serde::{Deserialize, Serialize};

use crate::combat::status::StatusTimers;
use crate::world::spatial::Position;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    /// Top-left tile of the footprint.
    pub pos: Position,
    pub width: i32,
    pub height: i32,
    pub hp: f32,
    pub max_hp: f32,
    pub status: StatusTimers,
    pub dead: bool,
}

impl Enemy {
    /// A walker scaled for the given floor. Floor 2 walkers are hulking
    /// 2x2 bruisers with double hp; floor 3 walkers keep their size but
    /// hit the hp multiplier instead.
    pub fn walker(floor: u32, pos: Position) -> Self {
        let mut hp = 30.0 + 10.0 * floor as f32;
        let (width, height) = if floor == 2 {
            hp *= 2.0;
            (2, 2)
        } else {
            (1, 1)
        };
        if floor >= 3 {
            hp *= 1.5;
        }
        Self {
            pos,
            width,
            height,
            hp,
            max_hp: hp,
            status: StatusTimers::new(),
            dead: false,
        }
    }

    /// Whether the footprint covers a tile.
    pub fn covers(&self, pos: Position) -> bool {
        pos.x >= self.pos.x
            && pos.x < self.pos.x + self.width
            && pos.y >= self.pos.y
            && pos.y < self.pos.y + self.height
    }

    /// Footprint cells for collision checks at an arbitrary origin.
    pub fn footprint_at(&self, origin: Position) -> impl Iterator<Item = Position> + '_ {
        let (w, h) = (self.width, self.height);
        (0..w).flat_map(move |dx| (0..h).map(move |dy| origin.offset(dx, dy)))
    }

    /// Apply damage; returns true if this killed the walker.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }
        self.hp -= amount;
        if self.hp <= 0.0 {
            self.dead = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walker_floor_scaling() {
        let w1 = Enemy::walker(1, Position::new(0, 0));
        assert_eq!(w1.max_hp, 40.0);
        assert_eq!((w1.width, w1.height), (1, 1));

        let w2 = Enemy::walker(2, Position::new(0, 0));
        assert_eq!(w2.max_hp, 100.0);
        assert_eq!((w2.width, w2.height), (2, 2));

        let w3 = Enemy::walker(3, Position::new(0, 0));
        assert_eq!(w3.max_hp, 90.0);
        assert_eq!((w3.width, w3.height), (1, 1));
    }

    #[test]
    fn test_footprint_coverage() {
        let w = Enemy::walker(2, Position::new(10, 10));
        assert!(w.covers(Position::new(10, 10)));
        assert!(w.covers(Position::new(11, 11)));
        assert!(!w.covers(Position::new(12, 10)));
        assert!(!w.covers(Position::new(9, 10)));
    }

    #[test]
    fn test_take_damage_kills_once() {
        let mut w = Enemy::walker(1, Position::new(0, 0));
        assert!(!w.take_damage(39.0));
        assert!(w.take_damage(5.0));
        assert!(w.dead);
        assert!(!w.take_damage(5.0));
    }
}
