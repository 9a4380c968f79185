//! Persistent player profile
//!
//! Character unlocks survive across runs as a small json file in the
//! platform config directory. Loading never fails a run: a missing or
//! corrupt profile just falls back to the defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;

use crate::entities::creature::CharacterKind;

const PROFILE_FILE: &str = "profile.json";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile io: {0}")]
    Io(#[from] std::io::Error),
    #[error("profile encoding: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub version: u32,
    pub unlocked: HashSet<CharacterKind>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            version: 1,
            unlocked: CharacterKind::ALL
                .iter()
                .copied()
                .filter(|c| c.unlocked_by_default())
                .collect(),
        }
    }
}

impl Profile {
    pub fn is_unlocked(&self, kind: CharacterKind) -> bool {
        self.unlocked.contains(&kind)
    }

    /// Victory reward: the full roster.
    pub fn unlock_all(&mut self) {
        self.unlocked.extend(CharacterKind::ALL);
    }
}

fn profile_path() -> PathBuf {
    ProjectDirs::from("com", "wyrmdelve", "Wyrmdelve")
        .map(|dirs| dirs.config_dir().join(PROFILE_FILE))
        .unwrap_or_else(|| PathBuf::from(PROFILE_FILE))
}

/// Load the profile, falling back to defaults on any failure.
pub fn load() -> Profile {
    let path = profile_path();
    match fs::read_to_string(&path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("corrupt profile at {:?}, using defaults: {}", path, e);
                Profile::default()
            }
        },
        Err(_) => Profile::default(),
    }
}

pub fn save(profile: &Profile) -> Result<(), ProfileError> {
    let path = profile_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(profile)?;
    fs::write(&path, raw)?;
    log::debug!("profile saved to {:?}", path);
    Ok(())
}
