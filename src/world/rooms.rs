//! Rooms and the floor-wide room graph
//!
//! A floor is a grid of 30x30 rooms addressed by (gx, gy). Rooms only
//! exist where generation grew them; a lookup outside the graph means
//! solid rock.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::spatial::Position;

/// Width of a room in tiles.
pub const ROOM_WIDTH: i32 = 30;
/// Height of a room in tiles.
pub const ROOM_HEIGHT: i32 = 30;
/// Floors in a full run.
pub const MAX_FLOORS: u32 = 3;
/// Width of the gap carved for each door.
pub const DOOR_WIDTH: i32 = 4;

/// The four cardinal directions. This is the single direction table the
/// whole crate shares; input adapters, door carving, and AI stepping all
/// go through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit velocity for this direction (y grows downward).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }
}

/// One room of the floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Grid coordinate of the room (not tiles).
    pub gx: i32,
    pub gy: i32,
    /// Directions with a carved door to an adjacent room.
    pub connections: Vec<Direction>,
    pub is_boss_room: bool,
    pub explored: bool,
}

impl Room {
    pub fn new(gx: i32, gy: i32) -> Self {
        Self {
            gx,
            gy,
            connections: Vec::new(),
            is_boss_room: false,
            explored: false,
        }
    }

    /// Tile coordinate of the room's top-left corner.
    pub fn base(&self) -> (i32, i32) {
        (self.gx * ROOM_WIDTH, self.gy * ROOM_HEIGHT)
    }

    /// Tile coordinate of the room's center.
    pub fn center(&self) -> Position {
        let (bx, by) = self.base();
        Position::new(bx + ROOM_WIDTH / 2, by + ROOM_HEIGHT / 2)
    }

    pub fn contains(&self, pos: Position) -> bool {
        let (bx, by) = self.base();
        pos.x >= bx && pos.x < bx + ROOM_WIDTH && pos.y >= by && pos.y < by + ROOM_HEIGHT
    }

    pub fn key(&self) -> (i32, i32) {
        (self.gx, self.gy)
    }
}

/// Which room grid cell a tile falls in. Floor division keeps this
/// correct for negative tile coordinates.
pub fn room_key_of(pos: Position) -> (i32, i32) {
    (pos.x.div_euclid(ROOM_WIDTH), pos.y.div_euclid(ROOM_HEIGHT))
}

/// All rooms on the current floor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomGraph {
    rooms: HashMap<(i32, i32), Room>,
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, room: Room) {
        self.rooms.insert(room.key(), room);
    }

    pub fn get(&self, key: (i32, i32)) -> Option<&Room> {
        self.rooms.get(&key)
    }

    pub fn get_mut(&mut self, key: (i32, i32)) -> Option<&mut Room> {
        self.rooms.get_mut(&key)
    }

    /// Room containing a tile, if any. `None` means impassable rock.
    pub fn room_at(&self, pos: Position) -> Option<&Room> {
        self.rooms.get(&room_key_of(pos))
    }

    pub fn room_at_mut(&mut self, pos: Position) -> Option<&mut Room> {
        self.rooms.get_mut(&room_key_of(pos))
    }

    pub fn boss_room(&self) -> Option<&Room> {
        self.rooms.values().find(|r| r.is_boss_room)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.rooms.keys().copied()
    }
}
