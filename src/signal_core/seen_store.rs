//! Persisted set of already-emitted alert ids
//!
//! The dedup contract: an alert_id that was emitted in any previous run is
//! suppressed in this one. A missing or corrupt state file degrades to an
//! empty set - worst case a duplicate notification, never a lost run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct SeenState {
    seen: HashSet<String>,
}

#[derive(Debug)]
pub struct SeenAlertStore {
    path: PathBuf,
    seen: HashSet<String>,
}

impl SeenAlertStore {
    /// Load the store, degrading to empty on any read/parse problem
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let seen = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<SeenState>(&json) {
                Ok(state) => state.seen,
                Err(e) => {
                    log::warn!("⚠️  Corrupt seen-alerts state at {}: {}", path.display(), e);
                    HashSet::new()
                }
            },
            Err(_) => {
                log::info!("No seen-alerts state at {}, starting fresh", path.display());
                HashSet::new()
            }
        };

        log::debug!("Loaded {} seen alert ids", seen.len());
        Self { path, seen }
    }

    pub fn contains(&self, alert_id: &str) -> bool {
        self.seen.contains(alert_id)
    }

    /// Returns true when the id was new
    pub fn insert(&mut self, alert_id: &str) -> bool {
        self.seen.insert(alert_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn save(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let state = SeenState {
            seen: self.seen.clone(),
        };
        let json = serde_json::to_string_pretty(&state)?;
        fs::write(&self.path, json)?;

        log::debug!("Saved {} seen alert ids to {}", self.seen.len(), self.path.display());
        Ok(())
    }
}
