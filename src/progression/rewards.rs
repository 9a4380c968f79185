//! Reward selection
//!
//! Level-ups and chests both present three choices. A category with a
//! free slot offers its whole catalog; a full category only offers
//! upgrades to what is already owned, so a choice is never dead on
//! arrival. An empty pool degenerates to a heal.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::inventory::Inventory;
use super::items::{PassiveKind, WeaponKind};

/// Choices offered per selection.
pub const CHOICES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardChoice {
    Weapon(WeaponKind),
    Passive(PassiveKind),
    /// Full heal; the fallback when nothing else can be offered.
    Heal,
}

impl RewardChoice {
    pub fn name(&self) -> &'static str {
        match self {
            RewardChoice::Weapon(kind) => kind.name(),
            RewardChoice::Passive(kind) => kind.name(),
            RewardChoice::Heal => "Full Heal",
        }
    }
}

/// Everything the inventory could currently accept.
fn eligible_pool(inventory: &Inventory) -> Vec<RewardChoice> {
    let mut pool = Vec::new();
    if inventory.weapon_slots_free() {
        pool.extend(WeaponKind::ALL.iter().map(|&k| RewardChoice::Weapon(k)));
    } else {
        pool.extend(
            inventory
                .weapons
                .iter()
                .map(|s| RewardChoice::Weapon(s.kind)),
        );
    }
    if inventory.passive_slots_free() {
        pool.extend(PassiveKind::ALL.iter().map(|&k| RewardChoice::Passive(k)));
    } else {
        pool.extend(
            inventory
                .passives
                .iter()
                .map(|s| RewardChoice::Passive(s.kind)),
        );
    }
    pool
}

/// Three level-up choices, drawn with replacement.
pub fn level_up_choices(rng: &mut StdRng, inventory: &Inventory) -> Vec<RewardChoice> {
    let pool = eligible_pool(inventory);
    if pool.is_empty() {
        return vec![RewardChoice::Heal];
    }
    (0..CHOICES)
        .map(|_| pool[rng.gen_range(0..pool.len())])
        .collect()
}

/// Three distinct chest choices from a shuffle of the pool.
pub fn chest_choices(rng: &mut StdRng, inventory: &Inventory) -> Vec<RewardChoice> {
    let mut pool = eligible_pool(inventory);
    if pool.is_empty() {
        return vec![RewardChoice::Heal];
    }
    pool.shuffle(rng);
    pool.truncate(CHOICES);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_open_inventory_offers_full_catalog() {
        let inv = Inventory::default();
        let pool = eligible_pool(&inv);
        assert_eq!(pool.len(), WeaponKind::ALL.len() + PassiveKind::ALL.len());
    }

    #[test]
    fn test_full_weapons_offer_owned_only() {
        let mut inv = Inventory::default();
        let owned = [
            WeaponKind::Dragonfire,
            WeaponKind::Snowball,
            WeaponKind::Venom,
            WeaponKind::Storm,
        ];
        for kind in owned {
            inv.acquire_weapon(kind);
        }
        let pool = eligible_pool(&inv);
        for choice in &pool {
            if let RewardChoice::Weapon(kind) = choice {
                assert!(owned.contains(kind), "unowned {:?} offered at capacity", kind);
            }
        }
    }

    #[test]
    fn test_level_up_always_three_choices() {
        let mut rng = StdRng::seed_from_u64(11);
        let inv = Inventory::default();
        for _ in 0..20 {
            assert_eq!(level_up_choices(&mut rng, &inv).len(), CHOICES);
        }
    }

    #[test]
    fn test_chest_choices_are_distinct() {
        let mut rng = StdRng::seed_from_u64(11);
        let inv = Inventory::default();
        for _ in 0..20 {
            let choices = chest_choices(&mut rng, &inv);
            assert_eq!(choices.len(), CHOICES);
            for i in 0..choices.len() {
                for j in (i + 1)..choices.len() {
                    assert_ne!(choices[i], choices[j]);
                }
            }
        }
    }
}
