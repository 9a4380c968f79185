//! Difficulty settings
//!
//! Two modes. Easy is for sightseeing: fewer obstacles, twice the food,
//! and a slower body so there is time to think.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Normal,
    Easy,
}

impl Difficulty {
    /// Multiplier on per-room obstacle counts.
    pub fn obstacle_mult(&self) -> f32 {
        match self {
            Difficulty::Normal => 1.0,
            Difficulty::Easy => 0.5,
        }
    }

    /// Multiplier on floor resource counts.
    pub fn resource_mult(&self) -> u32 {
        match self {
            Difficulty::Normal => 1,
            Difficulty::Easy => 2,
        }
    }

    /// Multiplier on the base movement delay (larger = slower body).
    pub fn speed_mult(&self) -> i32 {
        match self {
            Difficulty::Normal => 1,
            Difficulty::Easy => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Normal => "Normal",
            Difficulty::Easy => "Easy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easy_is_gentler() {
        assert!(Difficulty::Easy.obstacle_mult() < Difficulty::Normal.obstacle_mult());
        assert!(Difficulty::Easy.resource_mult() > Difficulty::Normal.resource_mult());
        assert!(Difficulty::Easy.speed_mult() > Difficulty::Normal.speed_mult());
    }
}
