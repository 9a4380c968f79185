//! Wyrmdelve - a headless, tick-driven dungeon crawl
//!
//! The whole game is a deterministic simulation behind one aggregate:
//! construct a [`game::Game`], feed it normalized [`game::Intent`]s,
//! call [`game::Game::advance`] once per tick, and render whatever
//! [`game::Game::snapshot`] and the drained [`game::GameEvent`] queue
//! say. There is no rendering, timing, or device handling in here, so
//! any front end (terminal, wasm, tests) drives it the same way.

pub mod combat;
pub mod entities;
pub mod game;
pub mod progression;
pub mod save;
pub mod world;

pub use game::{Game, GameEvent, GameSettings, Intent, PlayerId, RunPhase, Snapshot};
pub use progression::difficulty::Difficulty;
