//! World model: spatial index, rooms, and floor generation

pub mod generation;
pub mod rooms;
pub mod spatial;

pub use rooms::{Direction, Room, RoomGraph, MAX_FLOORS, ROOM_HEIGHT, ROOM_WIDTH};
pub use spatial::{CrateGrid, Position, WallGrid};
