//! Floor bosses
//!
//! One boss per floor, asleep in the farthest room until a player walks
//! in. Floors 1 and 2 chase; the floor 3 boss fights with a telegraphed
//! dash instead.

use serde::{Deserialize, Serialize};

use crate::combat::status::StatusTimers;
use crate::world::spatial::Position;

/// Spawn countdown started when a player enters the boss room. Drained
/// by the current movement delay each tick, so faster parties wake the
/// boss in fewer ticks.
pub const SPAWN_COUNTDOWN: f32 = 60.0;

/// Ticks the floor 3 boss rests between dashes.
pub const DASH_IDLE_TICKS: u32 = 180;
/// Ticks of telegraph before a dash.
pub const DASH_PREPARE_TICKS: u32 = 60;
/// Maximum ticks a dash can run.
pub const DASH_DURATION_TICKS: u32 = 30;
/// Ticks a dash trail cell lingers.
pub const TRAIL_LIFE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    /// Asleep; the room has not been entered.
    Dormant,
    /// Countdown running, doors locked.
    Spawning,
    Active,
    Dead,
}

// ============================================================================
// Dash sub-machine (floor 3)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashStage {
    Idle,
    Preparing,
    Dashing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DashState {
    pub stage: DashStage,
    pub timer: u32,
    /// Axis-locked unit direction while dashing.
    pub dir: (i32, i32),
}

impl Default for DashState {
    fn default() -> Self {
        Self {
            stage: DashStage::Idle,
            timer: DASH_IDLE_TICKS,
            dir: (0, 0),
        }
    }
}

/// A cell of scorched ground left behind by a dash.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TrailCell {
    pub pos: Position,
    pub life: u32,
}

/// Fixed-capacity ring buffer of trail cells. A dash runs at one cell
/// per tick for at most [`DASH_DURATION_TICKS`] ticks, so the capacity
/// can never be the limiting factor; pushing past it just recycles the
/// oldest cell. No allocation after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashTrail {
    cells: [TrailCell; Self::CAPACITY],
    head: usize,
    len: usize,
}

impl DashTrail {
    pub const CAPACITY: usize = 32;

    pub fn new() -> Self {
        Self {
            cells: [TrailCell::default(); Self::CAPACITY],
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, pos: Position) {
        let slot = (self.head + self.len) % Self::CAPACITY;
        self.cells[slot] = TrailCell {
            pos,
            life: TRAIL_LIFE,
        };
        if self.len < Self::CAPACITY {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % Self::CAPACITY;
        }
    }

    /// Age every cell one tick and drop expired ones from the front.
    pub fn tick(&mut self) {
        for i in 0..self.len {
            let idx = (self.head + i) % Self::CAPACITY;
            self.cells[idx].life = self.cells[idx].life.saturating_sub(1);
        }
        while self.len > 0 && self.cells[self.head].life == 0 {
            self.head = (self.head + 1) % Self::CAPACITY;
            self.len -= 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailCell> {
        (0..self.len).map(move |i| &self.cells[(self.head + i) % Self::CAPACITY])
    }
}

impl Default for DashTrail {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Boss
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Boss {
    pub name: &'static str,
    /// Top-left tile of the bounding rect.
    pub pos: Position,
    pub width: i32,
    pub height: i32,
    pub hp: f32,
    pub max_hp: f32,
    pub phase: BossPhase,
    pub spawn_timer: f32,
    /// Ticks between chase steps.
    pub move_rate: u32,
    pub status: StatusTimers,
    pub dash: DashState,
    pub trail: DashTrail,
}

impl Boss {
    /// The boss guarding a floor, centered on a room-center tile.
    /// Two-player runs fight a half-again tougher version.
    pub fn for_floor(floor: u32, center: Position, two_players: bool) -> Self {
        let (name, hp, size, move_rate) = match floor {
            1 => ("Doom Bringer", 2000.0, 4, 10),
            2 => ("Fractal Guardian", 3500.0, 12, 8),
            _ => ("Void Emperor", 5000.0, 4, 5),
        };
        let hp = if two_players { hp * 1.5 } else { hp };
        Self {
            name,
            pos: Position::new(center.x - size / 2, center.y - size / 2),
            width: size,
            height: size,
            hp,
            max_hp: hp,
            phase: BossPhase::Dormant,
            spawn_timer: SPAWN_COUNTDOWN,
            move_rate,
            status: StatusTimers::new(),
            dash: DashState::default(),
            trail: DashTrail::new(),
        }
    }

    pub fn covers(&self, pos: Position) -> bool {
        pos.x >= self.pos.x
            && pos.x < self.pos.x + self.width
            && pos.y >= self.pos.y
            && pos.y < self.pos.y + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.pos.x + self.width / 2, self.pos.y + self.height / 2)
    }

    /// Footprint cells at an arbitrary origin (used for blocked checks).
    pub fn footprint_at(&self, origin: Position) -> impl Iterator<Item = Position> + '_ {
        let (w, h) = (self.width, self.height);
        (0..w).flat_map(move |dx| (0..h).map(move |dy| origin.offset(dx, dy)))
    }

    pub fn is_alive(&self) -> bool {
        !matches!(self.phase, BossPhase::Dead)
    }

    /// Damage only lands once the boss is awake. Returns true on the
    /// killing blow.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.phase != BossPhase::Active {
            return false;
        }
        self.hp -= amount;
        if self.hp <= 0.0 {
            self.phase = BossPhase::Dead;
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
    fn test_boss_tables() {
        let center = Position::new(45, 45);
        let b1 = Boss::for_floor(1, center, false);
        assert_eq!((b1.max_hp, b1.width, b1.move_rate), (2000.0, 4, 10));
        let b2 = Boss::for_floor(2, center, false);
        assert_eq!((b2.max_hp, b2.width, b2.move_rate), (3500.0, 12, 8));
        let b3 = Boss::for_floor(3, center, false);
        assert_eq!((b3.max_hp, b3.width, b3.move_rate), (5000.0, 4, 5));
        let coop = Boss::for_floor(1, center, true);
        assert_eq!(coop.max_hp, 3000.0);
    }

    #[test]
    fn test_dormant_boss_ignores_damage() {
        let mut boss = Boss::for_floor(1, Position::new(45, 45), false);
        assert!(!boss.take_damage(9999.0));
        assert_eq!(boss.hp, boss.max_hp);
        boss.phase = BossPhase::Active;
        assert!(boss.take_damage(9999.0));
        assert_eq!(boss.phase, BossPhase::Dead);
    }

    #[test]
    fn test_boss_hp_monotone_under_mixed_hits() {
        let mut boss = Boss::for_floor(2, Position::new(45, 45), false);
        boss.phase = BossPhase::Active;
        let mut last = boss.hp;
        for hit in [12.5, 0.0, 300.0, 700.0, 2499.0, 50.0] {
            boss.take_damage(hit);
            assert!(boss.hp <= last, "hp rose after a {hit} hit");
            last = boss.hp;
        }
        // The 2499 hit was the killing blow; later hits change nothing.
        assert_eq!(boss.phase, BossPhase::Dead);
        boss.take_damage(10.0);
        assert_eq!(boss.hp, last);
    }

    #[test]
    fn test_trail_expires() {
        let mut trail = DashTrail::new();
        trail.push(Position::new(1, 1));
        trail.push(Position::new(2, 1));
        for _ in 0..TRAIL_LIFE {
            assert!(!trail.is_empty());
            trail.tick();
        }
        assert!(trail.is_empty());
    }

    #[test]
    fn test_trail_recycles_past_capacity() {
        let mut trail = DashTrail::new();
        for i in 0..(DashTrail::CAPACITY + 5) {
            trail.push(Position::new(i as i32, 0));
        }
        assert_eq!(trail.len(), DashTrail::CAPACITY);
        // Oldest cells were recycled; the front of the ring is cell 5.
        let first = trail.iter().next().map(|c| c.pos.x);
        assert_eq!(first, Some(5));
    }

    #[test]
    fn test_trail_iter_order() {
        let mut trail = DashTrail::new();
        for i in 0..4 {
            trail.push(Position::new(i, 0));
        }
        let xs: Vec<_> = trail.iter().map(|c| c.pos.x).collect();
        assert_eq!(xs, vec![0, 1, 2, 3]);
    }
}
