// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-run resume state.
//!
//! After every successful platform call a workflow records what it
//! created under a stable key (derived from the input document's shape,
//! not from platform ids). `--continue` loads the file and skips any key
//! that is already present, so a resumed run never duplicates platform
//! objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use vq_core::CreatedResource;
use vq_error::PlatformError;

/// Directory under `~/.api-cli` that holds run state files.
pub const RUNS_DIR: &str = "runs";

/// Persisted state of one workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// The run id this state belongs to.
    pub run_id: String,
    /// Every resource created so far, in creation order.
    pub created: Vec<CreatedResource>,
    /// Completed plan keys and the ids they produced.
    pub keys: BTreeMap<String, serde_json::Value>,
    /// Whether the run ended by cancellation.
    pub cancelled: bool,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl RunState {
    /// Fresh state for a run id.
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            created: Vec::new(),
            keys: BTreeMap::new(),
            cancelled: false,
            updated_at: Utc::now(),
        }
    }

    /// Whether the plan key has already completed.
    #[must_use]
    pub fn is_done(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Recorded value for a completed key.
    #[must_use]
    pub fn recorded(&self, key: &str) -> Option<&serde_json::Value> {
        self.keys.get(key)
    }

    /// Record a completed key with its produced ids.
    pub fn record(&mut self, key: &str, value: serde_json::Value, created: Vec<CreatedResource>) {
        self.keys.insert(key.to_string(), value);
        self.created.extend(created);
        self.updated_at = Utc::now();
    }
}

/// File-backed store for run states.
#[derive(Debug, Clone)]
pub struct RunStateStore {
    dir: PathBuf,
}

impl RunStateStore {
    /// Store at the default location, `~/.api-cli/runs/`.
    pub fn open_default() -> Result<Self, PlatformError> {
        let dirs = directories::UserDirs::new()
            .ok_or_else(|| PlatformError::internal("cannot locate the user home directory"))?;
        Ok(Self::at(
            dirs.home_dir().join(vq_session::STATE_DIR).join(RUNS_DIR),
        ))
    }

    /// Store rooted at an explicit directory.
    #[must_use]
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the state file for a run id.
    #[must_use]
    pub fn path(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("{run_id}.state.json"))
    }

    /// Load state for a run; a missing file yields fresh state.
    pub fn load(&self, run_id: &str) -> Result<RunState, PlatformError> {
        let path = self.path(run_id);
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                PlatformError::validation(format!(
                    "run state file {} is corrupt: {e}",
                    path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RunState::new(run_id)),
            Err(e) => Err(PlatformError::internal(format!(
                "cannot read run state {}: {e}",
                path.display()
            ))),
        }
    }

    /// Persist state atomically (write temp + rename).
    pub fn save(&self, state: &RunState) -> Result<(), PlatformError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| PlatformError::internal(format!("cannot create runs dir: {e}")))?;
        let path = self.path(&state.run_id);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(state)
            .map_err(|e| PlatformError::internal(e.to_string()))?;
        fs::write(&tmp, body)
            .map_err(|e| PlatformError::internal(format!("cannot write run state: {e}")))?;
        fs::rename(&tmp, &path)
            .map_err(|e| PlatformError::internal(format!("cannot commit run state: {e}")))?;
        debug!(target: "vq.orchestrator", path = %path.display(), "run state saved");
        Ok(())
    }

    /// Delete a run's state file (after a fully successful run).
    pub fn remove(&self, run_id: &str) -> Result<(), PlatformError> {
        match fs::remove_file(self.path(run_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PlatformError::internal(format!(
                "cannot remove run state: {e}"
            ))),
        }
    }

    /// Directory the store writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
