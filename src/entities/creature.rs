//! Player creatures
//!
//! A creature is an ordered chain of body segments, head first. Movement
//! prepends a head and usually pops the tail; eating skips the pop, which
//! is how it grows.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::progression::items::WeaponKind;
use crate::world::rooms::Direction;
use crate::world::spatial::Position;

/// Queued-but-unapplied turn intents per creature.
pub const INTENT_QUEUE_DEPTH: usize = 2;
/// Segments a creature hatches with.
pub const STARTING_LENGTH: usize = 3;

/// Playable characters. Each carries an innate damage affinity and a
/// signature starting weapon; Frost and Venom also poison/chill on hit
/// (see combat::status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterKind {
    Ember,
    Frost,
    Venom,
    Plasma,
    Broadside,
    Storm,
    Cannon,
    Hydra,
}

impl CharacterKind {
    pub const ALL: [CharacterKind; 8] = [
        CharacterKind::Ember,
        CharacterKind::Frost,
        CharacterKind::Venom,
        CharacterKind::Plasma,
        CharacterKind::Broadside,
        CharacterKind::Storm,
        CharacterKind::Cannon,
        CharacterKind::Hydra,
    ];

    /// Multiplier applied to all projectile damage this character fires.
    pub fn damage_modifier(self) -> f32 {
        match self {
            CharacterKind::Ember => 1.2,
            CharacterKind::Cannon => 1.3,
            _ => 1.0,
        }
    }

    pub fn starting_weapon(self) -> WeaponKind {
        match self {
            CharacterKind::Ember => WeaponKind::Dragonfire,
            CharacterKind::Frost => WeaponKind::Snowball,
            CharacterKind::Venom => WeaponKind::Venom,
            CharacterKind::Plasma => WeaponKind::Plasma,
            CharacterKind::Broadside => WeaponKind::Broadside,
            CharacterKind::Storm => WeaponKind::Storm,
            CharacterKind::Cannon => WeaponKind::Cannon,
            CharacterKind::Hydra => WeaponKind::Hydra,
        }
    }

    /// Characters available before any victory.
    pub fn unlocked_by_default(self) -> bool {
        matches!(
            self,
            CharacterKind::Ember | CharacterKind::Frost | CharacterKind::Venom
        )
    }

    /// Frost and Venom runs grow slightly larger floors.
    pub fn risky(self) -> bool {
        matches!(self, CharacterKind::Frost | CharacterKind::Venom)
    }

    pub fn name(self) -> &'static str {
        match self {
            CharacterKind::Ember => "Ember Wyrm",
            CharacterKind::Frost => "Frost Wyrm",
            CharacterKind::Venom => "Venom Wyrm",
            CharacterKind::Plasma => "Plasma Wyrm",
            CharacterKind::Broadside => "Broadside Wyrm",
            CharacterKind::Storm => "Storm Wyrm",
            CharacterKind::Cannon => "Cannon Wyrm",
            CharacterKind::Hydra => "Hydra Wyrm",
        }
    }
}

/// One player-controlled creature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    pub kind: CharacterKind,
    /// Body segments, head first. Adjacent segments always touch
    /// orthogonally, except mid-teleport during a room transition (the
    /// whole body shifts by one rigid offset, preserving shape).
    pub body: VecDeque<Position>,
    /// Applied velocity, one axis at a time.
    pub velocity: (i32, i32),
    /// Last non-zero direction moved; default fire direction.
    pub last_dir: (i32, i32),
    /// Free-aim vector, only honored while TrueAim is owned.
    pub aim: Option<(f32, f32)>,
    intents: VecDeque<(i32, i32)>,
}

impl Creature {
    /// Hatch at a head position, body trailing straight down, moving up.
    pub fn spawn(kind: CharacterKind, head: Position) -> Self {
        let body = (0..STARTING_LENGTH as i32)
            .map(|i| head.offset(0, i))
            .collect();
        Self {
            kind,
            body,
            velocity: (0, -1),
            last_dir: (0, -1),
            aim: None,
            intents: VecDeque::new(),
        }
    }

    pub fn head(&self) -> Position {
        // Body is never empty: spawn seeds three segments and movement
        // always prepends before popping.
        self.body.front().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Queue a turn. A turn is only accepted when it changes an axis the
    /// reference velocity (back of queue, else current velocity) is not
    /// already using, so a chain can never fold back into itself.
    /// The queue holds at most [`INTENT_QUEUE_DEPTH`] turns.
    pub fn queue_intent(&mut self, dir: Direction) -> bool {
        if self.intents.len() >= INTENT_QUEUE_DEPTH {
            return false;
        }
        let (dx, dy) = dir.delta();
        let reference = self.intents.back().copied().unwrap_or(self.velocity);
        let accepted = (dx != 0 && reference.0 == 0) || (dy != 0 && reference.1 == 0);
        if accepted {
            self.intents.push_back((dx, dy));
        }
        accepted
    }

    /// Take the next queued turn, if any. Called once per movement tick.
    pub fn pop_intent(&mut self) -> Option<(i32, i32)> {
        self.intents.pop_front()
    }

    pub fn clear_intents(&mut self) {
        self.intents.clear();
    }

    /// Where the head lands next tick under the current velocity.
    pub fn next_head(&self) -> Position {
        self.head().offset(self.velocity.0, self.velocity.1)
    }

    /// Shift the whole body by one rigid offset (room teleport).
    pub fn translate(&mut self, dx: i32, dy: i32) {
        for segment in &mut self.body {
            *segment = segment.offset(dx, dy);
        }
    }

    /// Remember the current direction of travel. Runs every movement
    /// tick, including blocked ones, so weapons fire the way the player
    /// is pushing rather than the way the body last managed to move.
    pub fn mark_direction(&mut self) {
        if self.velocity != (0, 0) {
            self.last_dir = self.velocity;
        }
    }

    /// Advance one cell: prepend the new head, pop the tail unless the
    /// creature grew this tick.
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
        self.mark_direction();
    }

    /// Drop the tail segment, keeping at least the hatchling length.
    pub fn shed_tail(&mut self) -> bool {
        if self.body.len() > STARTING_LENGTH {
            self.body.pop_back();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creature() -> Creature {
        Creature::spawn(CharacterKind::Ember, Position::new(15, 15))
    }

    #[test]
    fn test_spawn_shape() {
        let c = creature();
        assert_eq!(c.len(), STARTING_LENGTH);
        assert_eq!(c.head(), Position::new(15, 15));
        assert_eq!(c.body[2], Position::new(15, 17));
        assert_eq!(c.velocity, (0, -1));
    }

    #[test]
    fn test_reversal_rejected() {
        let mut c = creature();
        // Moving up: up and down change no fresh axis.
        assert!(!c.queue_intent(Direction::Down));
        assert!(!c.queue_intent(Direction::Up));
        assert!(c.queue_intent(Direction::Left));
    }

    #[test]
    fn test_queue_checks_against_pending_turn() {
        let mut c = creature();
        assert!(c.queue_intent(Direction::Left));
        // Relative to the pending leftward turn, horizontal is taken but
        // vertical is free again.
        assert!(!c.queue_intent(Direction::Right));
        assert!(c.queue_intent(Direction::Down));
    }

    #[test]
    fn test_queue_depth_capped() {
        let mut c = creature();
        assert!(c.queue_intent(Direction::Left));
        assert!(c.queue_intent(Direction::Up));
        assert!(!c.queue_intent(Direction::Right));
        assert_eq!(c.pop_intent(), Some((-1, 0)));
        assert_eq!(c.pop_intent(), Some((0, -1)));
        assert_eq!(c.pop_intent(), None);
    }

    #[test]
    fn test_advance_and_grow() {
        let mut c = creature();
        c.advance(c.next_head(), false);
        assert_eq!(c.len(), STARTING_LENGTH);
        assert_eq!(c.head(), Position::new(15, 14));
        c.advance(c.next_head(), true);
        assert_eq!(c.len(), STARTING_LENGTH + 1);
    }

    #[test]
    fn test_translate_is_rigid() {
        let mut c = creature();
        let before: Vec<_> = c.body.iter().copied().collect();
        c.translate(30, -7);
        for (a, b) in before.iter().zip(c.body.iter()) {
            assert_eq!((b.x - a.x, b.y - a.y), (30, -7));
        }
    }

    #[test]
    fn test_shed_tail_stops_at_hatchling_length() {
        let mut c = creature();
        c.advance(c.next_head(), true);
        assert!(c.shed_tail());
        assert_eq!(c.len(), STARTING_LENGTH);
        assert!(!c.shed_tail());
        assert_eq!(c.len(), STARTING_LENGTH);
    }
}
