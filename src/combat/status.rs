//! Freeze and poison timers
//!
//! Both players' weapons and character innates can apply these; enemies
//! and the boss carry a timer block and tick it once per simulation tick.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entities::creature::CharacterKind;
use crate::progression::items::WeaponKind;

/// Ticks an applied freeze lasts.
pub const FREEZE_DURATION: u32 = 12;
/// Ticks an applied poison lasts.
pub const POISON_DURATION: u32 = 60;
/// Poison deals damage once every this many remaining ticks.
pub const POISON_TICK_INTERVAL: u32 = 6;
/// Damage per poison proc against regular enemies.
pub const POISON_DAMAGE: f32 = 5.0;

/// Result of ticking a timer block for one simulation tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusTick {
    /// Poison dealt damage this tick.
    pub poison_proc: bool,
}

/// Freeze/poison state carried by enemies and the boss.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusTimers {
    pub frozen: u32,
    pub poisoned: u32,
}

impl StatusTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply (or refresh) a freeze.
    pub fn freeze(&mut self) {
        self.frozen = self.frozen.max(FREEZE_DURATION);
    }

    /// Apply (or refresh) a poison.
    pub fn poison(&mut self) {
        self.poisoned = self.poisoned.max(POISON_DURATION);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen > 0
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned > 0
    }

    /// Advance both timers one tick. Poison procs on a fixed cadence of
    /// the remaining duration, so a fresh poison deals its first damage
    /// after [`POISON_TICK_INTERVAL`] ticks.
    pub fn tick(&mut self) -> StatusTick {
        let mut result = StatusTick::default();
        self.frozen = self.frozen.saturating_sub(1);
        if self.poisoned > 0 {
            self.poisoned -= 1;
            if self.poisoned > 0 && self.poisoned % POISON_TICK_INTERVAL == 0 {
                result.poison_proc = true;
            }
        }
        result
    }

    pub fn clear(&mut self) {
        self.frozen = 0;
        self.poisoned = 0;
    }
}

/// Apply on-hit status from a projectile to a target's timers.
///
/// Weapon effects roll first (snowball chills half the time, venom always
/// poisons), then the firing character's innate: frost characters chill
/// 30% of the time, venom characters always poison. Broadside cannons
/// carry no status at all.
pub fn apply_on_hit(
    rng: &mut StdRng,
    weapon: WeaponKind,
    owner: CharacterKind,
    target: &mut StatusTimers,
) {
    if weapon == WeaponKind::Broadside {
        return;
    }
    match weapon {
        WeaponKind::Snowball => {
            if rng.gen_bool(0.5) {
                target.freeze();
            }
        }
        WeaponKind::Venom => target.poison(),
        _ => {}
    }
    match owner {
        CharacterKind::Frost => {
            if rng.gen_bool(0.3) {
                target.freeze();
            }
        }
        CharacterKind::Venom => target.poison(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_freeze_expires() {
        let mut timers = StatusTimers::new();
        timers.freeze();
        for _ in 0..FREEZE_DURATION {
            assert!(timers.is_frozen());
            timers.tick();
        }
        assert!(!timers.is_frozen());
    }

    #[test]
    fn test_poison_proc_cadence() {
        let mut timers = StatusTimers::new();
        timers.poison();
        let mut procs = 0;
        for _ in 0..POISON_DURATION {
            if timers.tick().poison_proc {
                procs += 1;
            }
        }
        assert!(!timers.is_poisoned());
        // 60 ticks at one proc per 6 remaining, excluding the final zero.
        assert_eq!(procs, 9);
    }

    #[test]
    fn test_refresh_keeps_full_duration() {
        let mut timers = StatusTimers::new();
        timers.poison();
        for _ in 0..30 {
            timers.tick();
        }
        timers.poison();
        assert_eq!(timers.poisoned, POISON_DURATION);
    }

    #[test]
    fn test_venom_weapon_always_poisons() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut target = StatusTimers::new();
        apply_on_hit(&mut rng, WeaponKind::Venom, CharacterKind::Ember, &mut target);
        assert!(target.is_poisoned());
        assert!(!target.is_frozen());
    }

    #[test]
    fn test_broadside_applies_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        // Even a venom character's innate stays off side cannons.
        let mut target = StatusTimers::new();
        for _ in 0..50 {
            apply_on_hit(&mut rng, WeaponKind::Broadside, CharacterKind::Venom, &mut target);
        }
        assert!(!target.is_poisoned());
        assert!(!target.is_frozen());
    }

    #[test]
    fn test_snowball_chills_about_half_the_time() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut chills = 0;
        for _ in 0..200 {
            let mut target = StatusTimers::new();
            apply_on_hit(&mut rng, WeaponKind::Snowball, CharacterKind::Ember, &mut target);
            if target.is_frozen() {
                chills += 1;
            }
        }
        assert!((60..=140).contains(&chills), "chill count {chills} out of range");
    }
}
