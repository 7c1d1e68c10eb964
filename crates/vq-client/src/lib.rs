// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # vq-client
//!
//! The typed platform client: one method per operation the engine issues,
//! with the transport, headers, organization scoping, and retry policy
//! confined here. The orchestrator depends on the [`PlatformApi`] trait,
//! never on HTTP details; failures cross the seam already classified into
//! the `vq-error` taxonomy.

mod ops;
mod retry;
mod types;

pub use ops::{Descriptor, Operation, Retryable, Verb};
pub use retry::{retry_async, RetryPolicy};
pub use types::{
    AttachCheckpointRequest, Checkpoint, CreateCheckpointRequest, CreateGoalRequest,
    CreateJourneyRequest, CreateProjectRequest, Execution, ExecutionRef, ExecutionStatus, Goal,
    GoalCreated, GoalVersion, Journey, Project, StepCreated,
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use vq_core::{
    CheckpointId, ExecutionId, GoalId, JourneyId, ProjectId, ResourceKind, SnapshotId,
    StepPayload,
};
use vq_error::{ErrorKind, PlatformError};

/// Default platform endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api-app2.virtuoso.qa/api";
/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ── Trait ───────────────────────────────────────────────────────────────

/// The platform operations the core depends on.
///
/// Implementations must classify every failure into the `vq-error`
/// taxonomy before returning; callers never see transport-level error
/// types.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// `POST /projects`.
    async fn create_project(&self, name: &str) -> Result<Project, PlatformError>;

    /// `GET /projects`.
    async fn list_projects(&self) -> Result<Vec<Project>, PlatformError>;

    /// `POST /goals`. The platform also creates the pinned snapshot and
    /// the initial "Suite 1" journey; all three ids are returned.
    async fn create_goal(
        &self,
        project: ProjectId,
        name: &str,
        url: Option<&str>,
    ) -> Result<GoalCreated, PlatformError>;

    /// `GET /goals/{id}`.
    async fn get_goal(&self, goal: GoalId) -> Result<Goal, PlatformError>;

    /// `GET /goals` scoped to one project.
    async fn list_goals(&self, project: ProjectId) -> Result<Vec<Goal>, PlatformError>;

    /// `GET /goals/{id}/versions`.
    async fn goal_versions(&self, goal: GoalId) -> Result<Vec<GoalVersion>, PlatformError>;

    /// `POST /goals/{id}/snapshots/{sid}/execute`.
    async fn execute_goal(
        &self,
        goal: GoalId,
        snapshot: SnapshotId,
    ) -> Result<ExecutionRef, PlatformError>;

    /// `POST /testsuites`. Always carries both goal and snapshot ids.
    async fn create_journey(
        &self,
        goal: GoalId,
        snapshot: SnapshotId,
        name: &str,
    ) -> Result<Journey, PlatformError>;

    /// `GET /testsuites` for one goal + snapshot.
    async fn list_journeys(
        &self,
        goal: GoalId,
        snapshot: SnapshotId,
    ) -> Result<Vec<Journey>, PlatformError>;

    /// `PUT /testsuites/{id}` — rename.
    async fn rename_journey(
        &self,
        journey: JourneyId,
        name: &str,
    ) -> Result<Journey, PlatformError>;

    /// `POST /testcases`.
    async fn create_checkpoint(&self, title: &str) -> Result<Checkpoint, PlatformError>;

    /// `GET /testsuites/{id}/checkpoints`.
    async fn list_checkpoints(
        &self,
        journey: JourneyId,
    ) -> Result<Vec<Checkpoint>, PlatformError>;

    /// `POST /testsuites/{journeyId}/checkpoints/attach`. A checkpoint is
    /// live in a journey only after this call.
    async fn attach_checkpoint(
        &self,
        journey: JourneyId,
        checkpoint: CheckpointId,
        position: u32,
    ) -> Result<(), PlatformError>;

    /// `POST /teststeps`.
    async fn add_step(&self, payload: &StepPayload) -> Result<StepCreated, PlatformError>;

    /// `GET /executions/{id}`.
    async fn get_execution(&self, execution: ExecutionId) -> Result<Execution, PlatformError>;

    /// `DELETE` on the resource's canonical path.
    async fn delete_resource(&self, kind: ResourceKind, id: u32) -> Result<(), PlatformError>;

    /// Promote a checkpoint to the shared library.
    ///
    /// Extension point: the platform paths for library checkpoints are
    /// incomplete, so the default implementation refuses.
    async fn add_to_library(&self, checkpoint: CheckpointId) -> Result<(), PlatformError> {
        let _ = checkpoint;
        Err(
            PlatformError::new(ErrorKind::Validation, "library checkpoints are not supported")
                .with_operation("AddToLibrary"),
        )
    }
}

// ── Configuration ───────────────────────────────────────────────────────

/// Connection settings for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, without a trailing slash.
    pub base_url: String,
    /// Bearer token.
    pub token: String,
    /// Organization id sent as the `organizationId` query parameter.
    pub organization_id: String,
    /// `X-Virtuoso-Client-ID` header value.
    pub client_id: String,
    /// `X-Virtuoso-Client-Name` header value.
    pub client_name: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Backoff policy for retryable operations.
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Config for the default endpoint with the given credentials.
    #[must_use]
    pub fn new(
        token: impl Into<String>,
        organization_id: impl Into<String>,
        client_id: impl Into<String>,
        client_name: impl Into<String>,
    ) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            organization_id: organization_id.into(),
            client_id: client_id.into(),
            client_name: client_name.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the base URL (trailing slashes are trimmed).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

// ── HTTP implementation ─────────────────────────────────────────────────

/// `reqwest`-backed [`PlatformApi`] implementation.
#[derive(Debug, Clone)]
pub struct HttpPlatformClient {
    config: ClientConfig,
    http: reqwest::Client,
    run_id: Option<String>,
}

impl HttpPlatformClient {
    /// Build a client; fails only on invalid header values.
    pub fn new(config: ClientConfig) -> Result<Self, PlatformError> {
        use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", config.token);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|_| PlatformError::validation("API token contains invalid characters"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Virtuoso-Client-ID",
            HeaderValue::from_str(&config.client_id)
                .map_err(|_| PlatformError::validation("client id contains invalid characters"))?,
        );
        headers.insert(
            "X-Virtuoso-Client-Name",
            HeaderValue::from_str(&config.client_name).map_err(|_| {
                PlatformError::validation("client name contains invalid characters")
            })?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlatformError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http,
            run_id: None,
        })
    }

    /// A clone of this client whose created resources are tagged with
    /// `run_id`, enabling retry of idempotent creates and `--continue`.
    #[must_use]
    pub fn tagged(&self, run_id: impl Into<String>) -> Self {
        let mut clone = self.clone();
        clone.run_id = Some(run_id.into());
        clone
    }

    /// The run tag applied to create bodies, if any.
    #[must_use]
    pub fn run_tag(&self) -> Vec<String> {
        self.run_id.iter().map(|id| format!("run:{id}")).collect()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        op: Operation,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<T, PlatformError> {
        let mut req = self.http.request(method, self.url(path));
        if op.descriptor().org_scoped {
            req = req.query(&[("organizationId", self.config.organization_id.as_str())]);
        }
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        debug!(target: "vq.client", operation = op.name(), path, "issuing request");
        let resp = req.send().await.map_err(|e| transport_error(op, &e))?;
        let status = resp.status().as_u16();
        if (200..300).contains(&status) {
            let bytes = resp.bytes().await.map_err(|e| transport_error(op, &e))?;
            if bytes.is_empty() {
                // Unit-shaped responses (attach, delete) deserialise from null.
                return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
                    PlatformError::internal(format!(
                        "{} returned an empty body where content was expected",
                        op.name()
                    ))
                });
            }
            serde_json::from_slice(&bytes).map_err(|e| {
                PlatformError::internal(format!("{} response did not parse: {e}", op.name()))
            })
        } else {
            let retry_after = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let text = resp.text().await.unwrap_or_default();
            Err(PlatformError::from_response(
                op.name(),
                status,
                &text,
                retry_after,
            ))
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        op: Operation,
        method: reqwest::Method,
        path: String,
        query: Vec<(&'static str, String)>,
        body: Option<serde_json::Value>,
    ) -> Result<T, PlatformError> {
        let eligible = op.may_retry(self.run_id.is_some());
        retry_async(&self.config.retry, op.name(), eligible, || {
            // Each attempt gets owned copies; the future must not borrow
            // from the closure environment.
            let this = self.clone();
            let method = method.clone();
            let path = path.clone();
            let query = query.clone();
            let body = body.clone();
            async move {
                this.attempt::<T>(op, method, &path, &query, body.as_ref())
                    .await
            }
        })
        .await
    }
}

fn transport_error(op: Operation, err: &reqwest::Error) -> PlatformError {
    let detail = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "transport failure"
    };
    PlatformError::new(ErrorKind::Transport, format!("{detail}: {err}"))
        .with_operation(op.name())
}

fn delete_path(kind: ResourceKind, id: u32) -> String {
    let collection = match kind {
        ResourceKind::Project => "projects",
        ResourceKind::Goal => "goals",
        ResourceKind::Snapshot => "snapshots",
        ResourceKind::Journey => "testsuites",
        ResourceKind::Checkpoint => "testcases",
        ResourceKind::Step => "teststeps",
        ResourceKind::Execution => "executions",
    };
    format!("/{collection}/{id}")
}

#[async_trait]
impl PlatformApi for HttpPlatformClient {
    async fn create_project(&self, name: &str) -> Result<Project, PlatformError> {
        let body = serde_json::to_value(CreateProjectRequest {
            name: name.to_string(),
            tags: self.run_tag(),
        })
        .map_err(|e| PlatformError::internal(e.to_string()))?;
        self.send(
            Operation::CreateProject,
            reqwest::Method::POST,
            "/projects".into(),
            vec![],
            Some(body),
        )
        .await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, PlatformError> {
        self.send(
            Operation::ListProjects,
            reqwest::Method::GET,
            "/projects".into(),
            vec![],
            None,
        )
        .await
    }

    async fn create_goal(
        &self,
        project: ProjectId,
        name: &str,
        url: Option<&str>,
    ) -> Result<GoalCreated, PlatformError> {
        let body = serde_json::to_value(CreateGoalRequest {
            project_id: project,
            name: name.to_string(),
            url: url.map(str::to_string),
            tags: self.run_tag(),
        })
        .map_err(|e| PlatformError::internal(e.to_string()))?;
        self.send(
            Operation::CreateGoal,
            reqwest::Method::POST,
            "/goals".into(),
            vec![],
            Some(body),
        )
        .await
    }

    async fn get_goal(&self, goal: GoalId) -> Result<Goal, PlatformError> {
        self.send(
            Operation::GetGoal,
            reqwest::Method::GET,
            format!("/goals/{goal}"),
            vec![],
            None,
        )
        .await
    }

    async fn list_goals(&self, project: ProjectId) -> Result<Vec<Goal>, PlatformError> {
        self.send(
            Operation::ListGoals,
            reqwest::Method::GET,
            "/goals".into(),
            vec![("projectId", project.to_string())],
            None,
        )
        .await
    }

    async fn goal_versions(&self, goal: GoalId) -> Result<Vec<GoalVersion>, PlatformError> {
        self.send(
            Operation::GetGoalVersions,
            reqwest::Method::GET,
            format!("/goals/{goal}/versions"),
            vec![],
            None,
        )
        .await
    }

    async fn execute_goal(
        &self,
        goal: GoalId,
        snapshot: SnapshotId,
    ) -> Result<ExecutionRef, PlatformError> {
        self.send(
            Operation::ExecuteGoalSnapshot,
            reqwest::Method::POST,
            format!("/goals/{goal}/snapshots/{snapshot}/execute"),
            vec![],
            None,
        )
        .await
    }

    async fn create_journey(
        &self,
        goal: GoalId,
        snapshot: SnapshotId,
        name: &str,
    ) -> Result<Journey, PlatformError> {
        let body = serde_json::to_value(CreateJourneyRequest {
            goal_id: goal,
            snapshot_id: snapshot,
            name: name.to_string(),
            tags: self.run_tag(),
        })
        .map_err(|e| PlatformError::internal(e.to_string()))?;
        self.send(
            Operation::CreateJourney,
            reqwest::Method::POST,
            "/testsuites".into(),
            vec![],
            Some(body),
        )
        .await
    }

    async fn list_journeys(
        &self,
        goal: GoalId,
        snapshot: SnapshotId,
    ) -> Result<Vec<Journey>, PlatformError> {
        self.send(
            Operation::ListJourneys,
            reqwest::Method::GET,
            "/testsuites".into(),
            vec![
                ("goalId", goal.to_string()),
                ("snapshotId", snapshot.to_string()),
            ],
            None,
        )
        .await
    }

    async fn rename_journey(
        &self,
        journey: JourneyId,
        name: &str,
    ) -> Result<Journey, PlatformError> {
        self.send(
            Operation::RenameJourney,
            reqwest::Method::PUT,
            format!("/testsuites/{journey}"),
            vec![],
            Some(serde_json::json!({ "name": name })),
        )
        .await
    }

    async fn create_checkpoint(&self, title: &str) -> Result<Checkpoint, PlatformError> {
        let body = serde_json::to_value(CreateCheckpointRequest {
            title: title.to_string(),
            tags: self.run_tag(),
        })
        .map_err(|e| PlatformError::internal(e.to_string()))?;
        self.send(
            Operation::CreateCheckpoint,
            reqwest::Method::POST,
            "/testcases".into(),
            vec![],
            Some(body),
        )
        .await
    }

    async fn list_checkpoints(
        &self,
        journey: JourneyId,
    ) -> Result<Vec<Checkpoint>, PlatformError> {
        self.send(
            Operation::ListCheckpoints,
            reqwest::Method::GET,
            format!("/testsuites/{journey}/checkpoints"),
            vec![],
            None,
        )
        .await
    }

    async fn attach_checkpoint(
        &self,
        journey: JourneyId,
        checkpoint: CheckpointId,
        position: u32,
    ) -> Result<(), PlatformError> {
        let body = serde_json::to_value(AttachCheckpointRequest {
            checkpoint_id: checkpoint,
            position,
        })
        .map_err(|e| PlatformError::internal(e.to_string()))?;
        self.send(
            Operation::AttachCheckpoint,
            reqwest::Method::POST,
            format!("/testsuites/{journey}/checkpoints/attach"),
            vec![],
            Some(body),
        )
        .await
    }

    async fn add_step(&self, payload: &StepPayload) -> Result<StepCreated, PlatformError> {
        let body = serde_json::to_value(payload)
            .map_err(|e| PlatformError::internal(e.to_string()))?;
        self.send(
            Operation::AddStep,
            reqwest::Method::POST,
            "/teststeps".into(),
            vec![],
            Some(body),
        )
        .await
    }

    async fn get_execution(&self, execution: ExecutionId) -> Result<Execution, PlatformError> {
        self.send(
            Operation::GetExecution,
            reqwest::Method::GET,
            format!("/executions/{execution}"),
            vec![],
            None,
        )
        .await
    }

    async fn delete_resource(&self, kind: ResourceKind, id: u32) -> Result<(), PlatformError> {
        self.send(
            Operation::DeleteResource,
            reqwest::Method::DELETE,
            delete_path(kind, id),
            vec![],
            None,
        )
        .await
    }
}
