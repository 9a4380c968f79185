//! Shared run inventory
//!
//! Four weapon slots and four passive slots, shared by both players in
//! co-op. Acquiring an owned item deepens its stack instead of taking a
//! slot; a new item with no free slot in its category is rejected.

use serde::{Deserialize, Serialize};

use super::items::{PassiveKind, WeaponKind};

/// Slots per category.
pub const MAX_SLOTS: usize = 4;

/// An equipped weapon with its stack depth and last-fired tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponSlot {
    pub kind: WeaponKind,
    pub stack: u32,
    pub last_fired: u64,
}

/// An owned passive with its stack depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassiveSlot {
    pub kind: PassiveKind,
    pub stack: u32,
}

/// What happened when an item was offered to the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Took a fresh slot.
    Added,
    /// Already owned; stack deepened to the given depth.
    Upgraded(u32),
    /// New item, but the category is full. Inventory unchanged.
    Rejected,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub weapons: Vec<WeaponSlot>,
    pub passives: Vec<PassiveSlot>,
}

impl Inventory {
    /// Starting inventory from the selected characters' signature
    /// weapons, deduplicated into stacks.
    pub fn starting(weapons: &[WeaponKind]) -> Self {
        let mut inv = Self::default();
        for &kind in weapons {
            inv.acquire_weapon(kind);
        }
        inv
    }

    pub fn acquire_weapon(&mut self, kind: WeaponKind) -> AcquireOutcome {
        if let Some(slot) = self.weapons.iter_mut().find(|s| s.kind == kind) {
            slot.stack += 1;
            return AcquireOutcome::Upgraded(slot.stack);
        }
        if self.weapons.len() >= MAX_SLOTS {
            return AcquireOutcome::Rejected;
        }
        self.weapons.push(WeaponSlot {
            kind,
            stack: 1,
            last_fired: 0,
        });
        AcquireOutcome::Added
    }

    pub fn acquire_passive(&mut self, kind: PassiveKind) -> AcquireOutcome {
        if let Some(slot) = self.passives.iter_mut().find(|s| s.kind == kind) {
            slot.stack += 1;
            return AcquireOutcome::Upgraded(slot.stack);
        }
        if self.passives.len() >= MAX_SLOTS {
            return AcquireOutcome::Rejected;
        }
        self.passives.push(PassiveSlot { kind, stack: 1 });
        AcquireOutcome::Added
    }

    /// Drop a passive entirely (Diet removes itself once the work is done).
    pub fn remove_passive(&mut self, kind: PassiveKind) {
        self.passives.retain(|s| s.kind != kind);
    }

    pub fn weapon_stack(&self, kind: WeaponKind) -> u32 {
        self.weapons
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.stack)
            .unwrap_or(0)
    }

    pub fn passive_stack(&self, kind: PassiveKind) -> u32 {
        self.passives
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.stack)
            .unwrap_or(0)
    }

    /// Total stat contribution of a passive: per-stack value times depth.
    pub fn passive_total(&self, kind: PassiveKind) -> f32 {
        self.passive_stack(kind) as f32 * kind.per_stack_value()
    }

    pub fn has_weapon(&self, kind: WeaponKind) -> bool {
        self.weapon_stack(kind) > 0
    }

    pub fn has_passive(&self, kind: PassiveKind) -> bool {
        self.passive_stack(kind) > 0
    }

    pub fn weapon_slots_free(&self) -> bool {
        self.weapons.len() < MAX_SLOTS
    }

    pub fn passive_slots_free(&self) -> bool {
        self.passives.len() < MAX_SLOTS
    }
}

// ============================================================================
// Derived damage
// ============================================================================

/// Damage of one projectile before the crit roll.
///
/// Stacks add 20% of base each, the firing character's affinity scales
/// it, DamageUp scales it again, and owning broadsides taxes every main
/// weapon (the volley mass has to come from somewhere).
pub fn projectile_damage(
    kind: WeaponKind,
    stack: u32,
    character_modifier: f32,
    damage_percent_total: f32,
    broadside_stack: u32,
) -> f32 {
    let stack_mult = 1.0 + 0.2 * stack.saturating_sub(1) as f32;
    let mut dmg = kind.base_damage() * stack_mult * character_modifier * (1.0 + damage_percent_total);
    if kind != WeaponKind::Broadside && broadside_stack > 0 {
        dmg *= (1.0 - 0.2 * broadside_stack as f32).max(0.1);
    }
    dmg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stacking_never_takes_a_slot() {
        let mut inv = Inventory::default();
        assert_eq!(inv.acquire_weapon(WeaponKind::Dragonfire), AcquireOutcome::Added);
        for expect in 2..=6 {
            assert_eq!(
                inv.acquire_weapon(WeaponKind::Dragonfire),
                AcquireOutcome::Upgraded(expect)
            );
        }
        assert_eq!(inv.weapons.len(), 1);
        assert_eq!(inv.weapon_stack(WeaponKind::Dragonfire), 6);
    }

    #[test]
    fn test_fifth_weapon_rejected_unchanged() {
        let mut inv = Inventory::default();
        for kind in [
            WeaponKind::Dragonfire,
            WeaponKind::Snowball,
            WeaponKind::Venom,
            WeaponKind::Storm,
        ] {
            assert_eq!(inv.acquire_weapon(kind), AcquireOutcome::Added);
        }
        assert_eq!(inv.acquire_weapon(WeaponKind::Cannon), AcquireOutcome::Rejected);
        assert_eq!(inv.weapons.len(), MAX_SLOTS);
        assert!(!inv.has_weapon(WeaponKind::Cannon));
        // Stacking an owned one still works at capacity.
        assert_eq!(
            inv.acquire_weapon(WeaponKind::Storm),
            AcquireOutcome::Upgraded(2)
        );
    }

    #[test]
    fn test_passive_total_scales_with_stack() {
        let mut inv = Inventory::default();
        inv.acquire_passive(PassiveKind::DamageUp);
        inv.acquire_passive(PassiveKind::DamageUp);
        inv.acquire_passive(PassiveKind::DamageUp);
        assert!((inv.passive_total(PassiveKind::DamageUp) - 0.6).abs() < 1e-6);
        assert_eq!(inv.passive_total(PassiveKind::Armor), 0.0);
    }

    #[test]
    fn test_starting_inventory_dedupes() {
        let inv = Inventory::starting(&[WeaponKind::Venom, WeaponKind::Venom]);
        assert_eq!(inv.weapons.len(), 1);
        assert_eq!(inv.weapon_stack(WeaponKind::Venom), 2);
    }

    #[test]
    fn test_projectile_damage_formula() {
        // Stack 3, ember affinity, +40% damage, no broadsides:
        // 15 * 1.4 * 1.2 * 1.4 = 35.28
        let dmg = projectile_damage(WeaponKind::Dragonfire, 3, 1.2, 0.4, 0);
        assert!((dmg - 35.28).abs() < 1e-3);
    }

    #[test]
    fn test_broadside_tax_floors_at_ten_percent() {
        let untaxed = projectile_damage(WeaponKind::Storm, 1, 1.0, 0.0, 0);
        let taxed = projectile_damage(WeaponKind::Storm, 1, 1.0, 0.0, 2);
        assert!((taxed - untaxed * 0.6).abs() < 1e-6);
        let floored = projectile_damage(WeaponKind::Storm, 1, 1.0, 0.0, 9);
        assert!((floored - untaxed * 0.1).abs() < 1e-6);
        // Broadsides themselves are exempt.
        let side = projectile_damage(WeaponKind::Broadside, 1, 1.0, 0.0, 9);
        assert!((side - WeaponKind::Broadside.base_damage()).abs() < 1e-6);
    }
}
