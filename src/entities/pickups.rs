//! Food and treasure pickups

use serde::{Deserialize, Serialize};

use crate::world::spatial::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodKind {
    /// Heals on consumption; herds cluster around shared spawn points.
    Sheep,
    /// Grants xp on consumption; scattered anywhere.
    Wildfire,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Food {
    pub kind: FoodKind,
    pub pos: Position,
}

impl Food {
    pub fn sheep(pos: Position) -> Self {
        Self {
            kind: FoodKind::Sheep,
            pos,
        }
    }

    pub fn wildfire(pos: Position) -> Self {
        Self {
            kind: FoodKind::Wildfire,
            pos,
        }
    }
}

/// A treasure chest; opening one offers a three-way reward choice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Chest {
    pub pos: Position,
}

impl Chest {
    pub fn new(pos: Position) -> Self {
        Self { pos }
    }
}
