// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # vq-session
//!
//! The per-user session context: the "current" project, goal, snapshot,
//! journey and checkpoint IDs, plus the next step position. Step-creation
//! commands consult it when operands are omitted, and the orchestrator
//! updates it after successful creates.
//!
//! Persistence is a single YAML file under `~/.api-cli/`. Writes go to a
//! temp file in the same directory followed by a rename, so a concurrent
//! reader never observes partial state. The file is the sole source of
//! truth; nothing is cached across invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use vq_core::{CheckpointId, GoalId, JourneyId, ProjectId, SnapshotId};
use vq_error::PlatformError;

/// Directory under the user's home that holds CLI state.
pub const STATE_DIR: &str = ".api-cli";
/// Session file name inside [`STATE_DIR`].
pub const SESSION_FILE: &str = "session.yaml";

// ── Context ─────────────────────────────────────────────────────────────

/// The persisted session fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Current project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Current goal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<GoalId>,
    /// Snapshot pinned to the current goal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<SnapshotId>,
    /// Current journey.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journey_id: Option<JourneyId>,
    /// Current checkpoint; the implicit target of step creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_id: Option<CheckpointId>,
    /// Next 1-based step position within the current checkpoint.
    #[serde(default = "default_position")]
    pub next_position: u32,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

fn default_position() -> u32 {
    1
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            project_id: None,
            goal_id: None,
            snapshot_id: None,
            journey_id: None,
            checkpoint_id: None,
            next_position: 1,
            updated_at: Utc::now(),
        }
    }
}

impl SessionContext {
    /// Resolve the checkpoint a step should land in.
    ///
    /// Precedence: an explicit `--checkpoint` flag, then an explicit
    /// positional argument, then the session's current checkpoint.
    pub fn resolve_checkpoint(
        &self,
        flag: Option<CheckpointId>,
        positional: Option<CheckpointId>,
    ) -> Result<CheckpointId, PlatformError> {
        flag.or(positional).or(self.checkpoint_id).ok_or_else(|| {
            PlatformError::validation("no checkpoint in scope").with_hint(
                "pass --checkpoint <id>, add the checkpoint id as the last argument, \
                 or run `api-cli set-context --checkpoint <id>`",
            )
        })
    }

    /// Resolve the position for a new step: explicit argument first, then
    /// the session counter (which defaults to 1).
    #[must_use]
    pub fn resolve_position(&self, explicit: Option<u32>) -> u32 {
        explicit.unwrap_or(self.next_position)
    }

    /// Record a successful step creation at `position`.
    ///
    /// Auto-assigned positions advance the counter by one; explicit
    /// positions fast-forward it so the next auto step lands after them.
    pub fn record_step(&mut self, position: u32, explicit: bool) {
        if explicit {
            self.next_position = self.next_position.max(position + 1);
        } else {
            self.next_position += 1;
        }
        self.updated_at = Utc::now();
    }

    /// Point the session at a new checkpoint, resetting the position
    /// counter.
    pub fn enter_checkpoint(&mut self, checkpoint: CheckpointId) {
        self.checkpoint_id = Some(checkpoint);
        self.next_position = 1;
        self.updated_at = Utc::now();
    }

    /// Merge explicitly supplied fields into the context.
    pub fn set(&mut self, update: ContextUpdate) {
        if let Some(id) = update.project_id {
            self.project_id = Some(id);
        }
        if let Some(id) = update.goal_id {
            self.goal_id = Some(id);
        }
        if let Some(id) = update.snapshot_id {
            self.snapshot_id = Some(id);
        }
        if let Some(id) = update.journey_id {
            self.journey_id = Some(id);
        }
        if let Some(id) = update.checkpoint_id {
            self.enter_checkpoint(id);
        }
        if let Some(pos) = update.next_position {
            self.next_position = pos.max(1);
        }
        self.updated_at = Utc::now();
    }
}

/// Fields accepted by `set-context`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextUpdate {
    /// New current project.
    pub project_id: Option<ProjectId>,
    /// New current goal.
    pub goal_id: Option<GoalId>,
    /// New pinned snapshot.
    pub snapshot_id: Option<SnapshotId>,
    /// New current journey.
    pub journey_id: Option<JourneyId>,
    /// New current checkpoint (resets the position counter).
    pub checkpoint_id: Option<CheckpointId>,
    /// Override the next position.
    pub next_position: Option<u32>,
}

// ── Store ───────────────────────────────────────────────────────────────

/// Errors from session persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Filesystem failure.
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The session file exists but is not valid YAML.
    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_yaml::Error),

    /// The home directory could not be determined.
    #[error("cannot locate the user home directory")]
    NoHome,
}

impl From<SessionError> for PlatformError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Corrupt(_) => PlatformError::validation(err.to_string())
                .with_hint("run `api-cli clear-context` to discard the session file"),
            other => PlatformError::internal(other.to_string()),
        }
    }
}

/// File-backed session store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at the default location, `~/.api-cli/session.yaml`.
    pub fn open_default() -> Result<Self, SessionError> {
        let dirs = directories::UserDirs::new().ok_or(SessionError::NoHome)?;
        Ok(Self::at(
            dirs.home_dir().join(STATE_DIR).join(SESSION_FILE),
        ))
    }

    /// Store at an explicit path (tests, alternative state dirs).
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the session; a missing file yields a fresh default context.
    pub fn load(&self) -> Result<SessionContext, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_yaml::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(target: "vq.session", path = %self.path.display(), "no session file, starting fresh");
                Ok(SessionContext::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the session atomically (write temp + rename).
    pub fn save(&self, ctx: &SessionContext) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("yaml.tmp");
        fs::write(&tmp, serde_yaml::to_string(ctx)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(target: "vq.session", path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Delete the session file; succeeds when it does not exist.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
