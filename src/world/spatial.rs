//! Spatial index for tile occupancy
//!
//! Tile coordinates are packed into a single u32 key so wall and crate
//! lookups stay O(1) HashSet/HashMap hits. Nothing outside this module
//! touches packed keys directly.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Offset applied to both axes before packing, so negative coordinates
/// pack into non-negative 16-bit halves.
const PACK_OFFSET: i32 = 10_000;

/// Accumulated piercing damage that destroys a wall tile.
pub const WALL_BREAK_THRESHOLD: f32 = 50.0;

/// Hit points of a destructible crate.
pub const CRATE_HP: f32 = 5.0;

/// Pack a tile coordinate into a single key.
///
/// Bijective for x and y in `-10_000..=55_535`; every coordinate the
/// generator can produce is well inside that range.
pub fn pack(x: i32, y: i32) -> u32 {
    (((x + PACK_OFFSET) as u32) << 16) | ((y + PACK_OFFSET) as u32 & 0xFFFF)
}

/// Invert [`pack`].
pub fn unpack(key: u32) -> (i32, i32) {
    let x = (key >> 16) as i32 - PACK_OFFSET;
    let y = (key & 0xFFFF) as i32 - PACK_OFFSET;
    (x, y)
}

/// A tile position on the global grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance (4-directional movement cost)
    pub fn manhattan_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev distance (8-directional movement cost)
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

// ============================================================================
// Wall Grid
// ============================================================================

/// Sparse wall occupancy with a parallel piercing-damage accumulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WallGrid {
    walls: HashSet<u32>,
    damage: HashMap<u32, f32>,
}

impl WallGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a wall. Returns false if one was already there.
    pub fn insert(&mut self, x: i32, y: i32) -> bool {
        self.walls.insert(pack(x, y))
    }

    /// Remove a wall and any accumulated damage on it.
    pub fn remove(&mut self, x: i32, y: i32) -> bool {
        let key = pack(x, y);
        self.damage.remove(&key);
        self.walls.remove(&key)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.walls.contains(&pack(x, y))
    }

    /// Accumulate piercing damage on a wall tile. At the break threshold
    /// the wall and its accumulator entry are cleared together and the
    /// call reports destruction.
    pub fn apply_pierce(&mut self, x: i32, y: i32, amount: f32) -> bool {
        let key = pack(x, y);
        if !self.walls.contains(&key) {
            return false;
        }
        let total = self.damage.entry(key).or_insert(0.0);
        *total += amount;
        if *total >= WALL_BREAK_THRESHOLD {
            self.damage.remove(&key);
            self.walls.remove(&key);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.walls.iter().map(|&k| unpack(k))
    }
}

// ============================================================================
// Crate Grid
// ============================================================================

/// Destructible crates, keyed the same way as walls, with remaining hp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrateGrid {
    crates: HashMap<u32, f32>,
}

impl CrateGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, x: i32, y: i32) {
        self.crates.insert(pack(x, y), CRATE_HP);
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.crates.contains_key(&pack(x, y))
    }

    pub fn remove(&mut self, x: i32, y: i32) -> bool {
        self.crates.remove(&pack(x, y)).is_some()
    }

    /// Damage a crate. Returns true if it was destroyed.
    pub fn damage(&mut self, x: i32, y: i32, amount: f32) -> bool {
        let key = pack(x, y);
        match self.crates.get_mut(&key) {
            Some(hp) => {
                *hp -= amount;
                if *hp <= 0.0 {
                    self.crates.remove(&key);
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.crates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.crates.keys().map(|&k| unpack(k))
    }
}
