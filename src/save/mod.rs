//! Cross-run persistence

pub mod profile;

pub use profile::{Profile, ProfileError};
