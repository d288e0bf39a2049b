use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Identifiers of items already turned into drafts, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenState {
    #[serde(default)]
    pub seen_ids: Vec<String>,
}

impl SeenState {
    pub fn len(&self) -> usize {
        self.seen_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen_ids.is_empty()
    }

    /// Lookup set for filtering fetched records
    pub fn id_set(&self) -> HashSet<&str> {
        self.seen_ids.iter().map(String::as_str).collect()
    }

    /// Append ids that are not already present, keeping their order
    pub fn record<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut known: HashSet<String> = self.seen_ids.iter().cloned().collect();
        for id in ids {
            if known.insert(id.clone()) {
                self.seen_ids.push(id);
            }
        }
    }

    /// Keep only the most recent `cap` ids
    pub fn truncate_to_recent(&mut self, cap: usize) {
        if self.seen_ids.len() > cap {
            let excess = self.seen_ids.len() - cap;
            self.seen_ids.drain(..excess);
        }
    }

    /// The most recent `n` ids, newest last
    pub fn recent(&self, n: usize) -> &[String] {
        let start = self.seen_ids.len().saturating_sub(n);
        &self.seen_ids[start..]
    }
}

/// Flat JSON file holding the seen state between runs
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    cap: usize,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last saved state. A missing or unreadable file yields an empty state.
    pub fn load(&self) -> SeenState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No state file at {}, starting fresh", self.path.display());
                return SeenState::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read state file {}: {}", self.path.display(), e);
                return SeenState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Ignoring corrupt state file {}: {}", self.path.display(), e);
                SeenState::default()
            }
        }
    }

    /// Overwrite the state file with the most recent `cap` ids
    pub fn save(&self, state: &SeenState) -> Result<()> {
        let mut state = state.clone();
        state.truncate_to_recent(self.cap);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&state)?;
        std::fs::write(&self.path, content)?;

        tracing::debug!("Saved {} seen ids to {}", state.len(), self.path.display());
        Ok(())
    }

    /// Delete the state file; returns false if there was nothing to delete
    pub fn reset(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
