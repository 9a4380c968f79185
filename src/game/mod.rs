//! The simulation core: state, tick pipeline, AI, input, and the
//! read-only surfaces front ends consume.

pub mod ai;
pub mod events;
pub mod input;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use events::GameEvent;
pub use input::{Intent, PlayerId};
pub use snapshot::{Hud, Snapshot};
pub use state::{Game, GameSettings, RunPhase, World};
