//! Weapon and passive catalogs
//!
//! Flat stat tables for everything that can appear in a reward pool.
//! Stacking math lives in the inventory; this module only knows base
//! numbers.

use serde::{Deserialize, Serialize};

/// Every weapon in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Baseline bolt, solid rate and damage.
    Dragonfire,
    /// Chilling shot, chance to freeze on hit.
    Snowball,
    /// Poisoning shot, weak direct damage.
    Venom,
    /// Fires forward and to both flanks at once.
    Hydra,
    /// Very fast, very weak bolts.
    Storm,
    /// Slow, devastating shells that detonate on impact.
    Cannon,
    /// Mounted on body segments, firing perpendicular volleys.
    Broadside,
    /// Arcs chain lightning to nearby enemies.
    Plasma,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 8] = [
        WeaponKind::Dragonfire,
        WeaponKind::Snowball,
        WeaponKind::Venom,
        WeaponKind::Hydra,
        WeaponKind::Storm,
        WeaponKind::Cannon,
        WeaponKind::Broadside,
        WeaponKind::Plasma,
    ];

    /// Base ticks between shots, before speed and berserk modifiers.
    pub fn fire_rate(self) -> u32 {
        match self {
            WeaponKind::Dragonfire => 40,
            WeaponKind::Snowball => 30,
            WeaponKind::Venom => 40,
            WeaponKind::Hydra => 60,
            WeaponKind::Storm => 24,
            WeaponKind::Cannon => 120,
            WeaponKind::Broadside => 60,
            WeaponKind::Plasma => 24,
        }
    }

    /// Base damage of a single projectile at stack 1.
    pub fn base_damage(self) -> f32 {
        match self {
            WeaponKind::Dragonfire => 15.0,
            WeaponKind::Snowball => 12.0,
            WeaponKind::Venom => 8.0,
            WeaponKind::Hydra => 10.0,
            WeaponKind::Storm => 5.0,
            WeaponKind::Cannon => 50.0,
            WeaponKind::Broadside => 4.0,
            WeaponKind::Plasma => 12.0,
        }
    }

    /// Tiles traveled per projectile integration step.
    pub fn projectile_speed(self) -> f32 {
        match self {
            WeaponKind::Dragonfire => 0.75,
            WeaponKind::Snowball => 1.0,
            WeaponKind::Venom => 0.75,
            WeaponKind::Hydra => 0.5,
            WeaponKind::Storm => 1.25,
            WeaponKind::Cannon => 0.5,
            WeaponKind::Broadside => 0.5,
            WeaponKind::Plasma => 1.25,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::Dragonfire => "Dragonfire",
            WeaponKind::Snowball => "Snowball",
            WeaponKind::Venom => "Venom Spit",
            WeaponKind::Hydra => "Hydra Maw",
            WeaponKind::Storm => "Stormbolt",
            WeaponKind::Cannon => "Siege Cannon",
            WeaponKind::Broadside => "Broadside",
            WeaponKind::Plasma => "Plasma Arc",
        }
    }
}

// ============================================================================
// Passives
// ============================================================================

/// Every passive in the game. Each stack adds [`per_stack_value`] to the
/// stat it governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassiveKind {
    /// +20% projectile damage per stack.
    DamageUp,
    /// Flat damage reduction.
    Armor,
    /// +10 max hp (and +5 current) per stack, plus slow regeneration.
    Heart,
    /// Faster firing.
    Swiftness,
    /// Pulls nearby pickups toward the head.
    Magnet,
    /// Fire faster at low hp.
    Berserk,
    /// Consume enemies head-on for healing and xp.
    Devour,
    /// Projectiles ricochet off walls.
    Bounce,
    /// Better drop chances everywhere.
    Lucky,
    /// XP for every wall and crate destroyed.
    Miner,
    /// More xp from embers.
    Scholar,
    /// Chance to deal double damage.
    CritChance,
    /// Projectiles grind through walls.
    Pierce,
    /// Sheds tail segments down to a minimum length, then expires.
    Diet,
    /// Fire along a free aim vector instead of the facing direction.
    TrueAim,
    /// Shrinks enemy detection range.
    Mist,
}

impl PassiveKind {
    pub const ALL: [PassiveKind; 16] = [
        PassiveKind::DamageUp,
        PassiveKind::Armor,
        PassiveKind::Heart,
        PassiveKind::Swiftness,
        PassiveKind::Magnet,
        PassiveKind::Berserk,
        PassiveKind::Devour,
        PassiveKind::Bounce,
        PassiveKind::Lucky,
        PassiveKind::Miner,
        PassiveKind::Scholar,
        PassiveKind::CritChance,
        PassiveKind::Pierce,
        PassiveKind::Diet,
        PassiveKind::TrueAim,
        PassiveKind::Mist,
    ];

    /// Stat contribution of one stack.
    pub fn per_stack_value(self) -> f32 {
        match self {
            PassiveKind::DamageUp => 0.2,
            PassiveKind::Armor => 1.0,
            PassiveKind::Heart => 10.0,
            PassiveKind::Swiftness => 0.2,
            PassiveKind::Magnet => 1.0,
            PassiveKind::Berserk => 0.3,
            PassiveKind::Devour => 1.0,
            PassiveKind::Bounce => 1.0,
            PassiveKind::Lucky => 0.1,
            PassiveKind::Miner => 0.25,
            PassiveKind::Scholar => 0.3,
            PassiveKind::CritChance => 0.1,
            PassiveKind::Pierce => 1.0,
            PassiveKind::Diet => 1.0,
            PassiveKind::TrueAim => 1.0,
            PassiveKind::Mist => 3.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PassiveKind::DamageUp => "Whetted Fangs",
            PassiveKind::Armor => "Iron Scales",
            PassiveKind::Heart => "Wyrm Heart",
            PassiveKind::Swiftness => "Swiftness",
            PassiveKind::Magnet => "Lodestone",
            PassiveKind::Berserk => "Berserk",
            PassiveKind::Devour => "Devour",
            PassiveKind::Bounce => "Ricochet",
            PassiveKind::Lucky => "Lucky Charm",
            PassiveKind::Miner => "Tunneler",
            PassiveKind::Scholar => "Scholar",
            PassiveKind::CritChance => "Killer Instinct",
            PassiveKind::Pierce => "Drillhead",
            PassiveKind::Diet => "Lean Diet",
            PassiveKind::TrueAim => "True Aim",
            PassiveKind::Mist => "Mistveil",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogs_are_complete() {
        assert_eq!(WeaponKind::ALL.len(), 8);
        assert_eq!(PassiveKind::ALL.len(), 16);
    }

    #[test]
    fn test_cannon_is_slowest_and_hardest() {
        for kind in WeaponKind::ALL {
            if kind != WeaponKind::Cannon {
                assert!(kind.fire_rate() < WeaponKind::Cannon.fire_rate());
                assert!(kind.base_damage() < WeaponKind::Cannon.base_damage());
            }
        }
    }

    #[test]
    fn test_per_stack_values_positive() {
        for kind in PassiveKind::ALL {
            assert!(kind.per_stack_value() > 0.0, "{:?}", kind);
        }
    }
}
