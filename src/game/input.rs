//! Normalized input intents
//!
//! Front ends translate whatever devices they own into these intents;
//! the sim never sees keys or pointers. Directions go through the one
//! shared [`Direction`] table, so every adapter agrees on what "up"
//! means.

use serde::{Deserialize, Serialize};

use crate::world::rooms::Direction;

/// Which player an intent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }
}

/// A single normalized input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Queue a turn; subject to the reversal rule and queue depth.
    Turn(Direction),
    /// Free-aim vector (normalized); only honored with TrueAim owned.
    Aim(f32, f32),
    /// Clear the aim vector, reverting to facing-direction fire.
    ClearAim,
    /// Confirm the pending reward choice by index.
    Confirm(usize),
    /// Dismiss a pending choice without picking (keeps it pending).
    Cancel,
    Pause,
    Resume,
}
