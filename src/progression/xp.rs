//! Experience and leveling
//!
//! XP is shared by both players. Gains can be fractional (Tunneler
//! trickles quarter-points per wall), so the pool is an f32.

use serde::{Deserialize, Serialize};

/// XP required for the first level-up.
pub const FIRST_LEVEL_COST: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpState {
    pub level: u32,
    pub xp: f32,
    pub to_next: u32,
}

impl Default for XpState {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0.0,
            to_next: FIRST_LEVEL_COST,
        }
    }
}

impl XpState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add xp. Returns true when this gain crossed the level boundary;
    /// the pool resets to zero on level-up (overflow is not banked) and
    /// the next threshold grows by 10% plus 2.
    pub fn grant(&mut self, amount: f32) -> bool {
        self.xp += amount;
        if self.xp >= self.to_next as f32 {
            self.level += 1;
            self.xp = 0.0;
            self.to_next = (self.to_next as f32 * 1.1) as u32 + 2;
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
    fn test_first_level_up() {
        let mut xp = XpState::new();
        assert!(!xp.grant(4.0));
        assert!(xp.grant(1.0));
        assert_eq!(xp.level, 2);
        assert_eq!(xp.xp, 0.0);
        assert_eq!(xp.to_next, 7); // floor(5 * 1.1) + 2
    }

    #[test]
    fn test_overflow_is_discarded() {
        let mut xp = XpState::new();
        assert!(xp.grant(100.0));
        assert_eq!(xp.level, 2);
        assert_eq!(xp.xp, 0.0);
    }

    #[test]
    fn test_threshold_growth() {
        let mut xp = XpState::new();
        let mut thresholds = vec![xp.to_next];
        for _ in 0..5 {
            xp.grant(xp.to_next as f32);
            thresholds.push(xp.to_next);
        }
        assert_eq!(thresholds, vec![5, 7, 9, 11, 14, 17]);
    }

    #[test]
    fn test_fractional_gains_accumulate() {
        let mut xp = XpState::new();
        for _ in 0..19 {
            assert!(!xp.grant(0.25));
        }
        assert!(xp.grant(0.25));
        assert_eq!(xp.level, 2);
    }
}
