// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand dispatch: wire validated arguments into the core crates and
//! render the structured results.

use crate::{steps, Commands};
use std::sync::Arc;
use vq_catalog::StepKind;
use vq_client::{ClientConfig, HttpPlatformClient, PlatformApi};
use vq_config::{Config, Overrides};
use vq_core::{
    CheckpointId, CreatedResource, ExecutionId, GoalId, JourneyId, OperationResult, ProjectId,
    ResourceKind, SnapshotId,
};
use vq_error::PlatformError;
use vq_format::{OutputFormat, Renderer, Table};
use vq_orchestrator::{
    generate_run_id, plan_structure, scenario_structure, CancelToken, CleanupFilter,
    FailurePolicy, Orchestrator, PollConfig, RunOptions, RunStateStore, Structure,
};
use vq_session::{ContextUpdate, SessionStore};

/// Resolve configuration, run the command, and hand back the chosen
/// output format along with the rendered output.
pub async fn dispatch(
    command: Commands,
    overrides: Overrides,
) -> (OutputFormat, Result<String, PlatformError>) {
    let config = match Config::load(overrides) {
        Ok(config) => config,
        Err(err) => return (OutputFormat::Human, Err(err)),
    };
    let format = crate::output_format(config.output_format.as_deref());
    let renderer = Renderer::new(format);
    let result = run(command, &config, &renderer).await;
    (format, result)
}

async fn run(
    command: Commands,
    config: &Config,
    renderer: &Renderer,
) -> Result<String, PlatformError> {
    match command {
        // ── Projects ────────────────────────────────────────────────
        Commands::CreateProject { name } => {
            let client = client(config)?;
            let project = client.create_project(&name).await?;
            update_session(|ctx| {
                ctx.set(ContextUpdate {
                    project_id: Some(project.id),
                    ..Default::default()
                });
            })?;
            let result = OperationResult::new("create-project")
                .with_input("name", &name)
                .with_created(CreatedResource::named(
                    ResourceKind::Project,
                    project.id.as_u32(),
                    &project.name,
                ));
            Ok(renderer.result(&result))
        }

        Commands::ListProjects => {
            let client = client(config)?;
            let projects = client.list_projects().await?;
            let mut table = Table::new(&["id", "name"]);
            for p in &projects {
                table.push(vec![p.id.to_string(), p.name.clone()]);
            }
            let payload = serde_json::to_value(&projects)
                .map_err(|e| PlatformError::internal(e.to_string()))?;
            Ok(renderer.listing("list-projects", &table, &payload))
        }

        // ── Goals ───────────────────────────────────────────────────
        Commands::CreateGoal {
            name,
            url,
            project_id,
        } => {
            let client = client(config)?;
            let session = session_store()?;
            let ctx = session.load()?;
            let project = project_id
                .map(ProjectId)
                .or(ctx.project_id)
                .ok_or_else(|| {
                    PlatformError::validation("no project in scope")
                        .with_hint("pass --project-id or run `api-cli set-context --project <id>`")
                })?;
            let created = client.create_goal(project, &name, url.as_deref()).await?;
            update_session(|ctx| {
                ctx.set(ContextUpdate {
                    project_id: Some(project),
                    goal_id: Some(created.id),
                    snapshot_id: Some(created.snapshot_id),
                    journey_id: Some(created.initial_journey_id),
                    ..Default::default()
                });
            })?;
            // The implicit journey is surfaced alongside the goal.
            let result = OperationResult::new("create-goal")
                .with_input("name", &name)
                .with_input("project", project)
                .with_created(CreatedResource::named(
                    ResourceKind::Goal,
                    created.id.as_u32(),
                    &created.name,
                ))
                .with_created(CreatedResource::new(
                    ResourceKind::Snapshot,
                    created.snapshot_id.as_u32(),
                ))
                .with_created(CreatedResource::named(
                    ResourceKind::Journey,
                    created.initial_journey_id.as_u32(),
                    vq_orchestrator::INITIAL_JOURNEY_NAME,
                ));
            Ok(renderer.result(&result))
        }

        Commands::ListGoals { project_id } => {
            let client = client(config)?;
            let ctx = session_store()?.load()?;
            let project = project_id.map(ProjectId).or(ctx.project_id).ok_or_else(|| {
                PlatformError::validation("no project in scope")
                    .with_hint("pass a project id or run `api-cli set-context --project <id>`")
            })?;
            let goals = client.list_goals(project).await?;
            let mut table = Table::new(&["id", "name", "snapshot"]);
            for g in &goals {
                table.push(vec![
                    g.id.to_string(),
                    g.name.clone(),
                    g.snapshot_id.map(|s| s.to_string()).unwrap_or_default(),
                ]);
            }
            let payload = serde_json::to_value(&goals)
                .map_err(|e| PlatformError::internal(e.to_string()))?;
            Ok(renderer.listing("list-goals", &table, &payload))
        }

        // ── Journeys ────────────────────────────────────────────────
        Commands::CreateJourney {
            name,
            goal,
            snapshot,
        } => {
            let client = client(config)?;
            let ctx = session_store()?.load()?;
            let goal = goal.map(GoalId).or(ctx.goal_id).ok_or_else(no_goal)?;
            let orch = orchestrator(client.clone())?;
            // Journey creation always carries goal + snapshot.
            let snapshot = match snapshot.map(SnapshotId).or(ctx.snapshot_id) {
                Some(s) => s,
                None => orch.resolve_snapshot(goal).await?,
            };
            let journey = client.create_journey(goal, snapshot, &name).await?;
            update_session(|ctx| {
                ctx.set(ContextUpdate {
                    journey_id: Some(journey.id),
                    snapshot_id: Some(snapshot),
                    ..Default::default()
                });
            })?;
            let result = OperationResult::new("create-journey")
                .with_input("goal", goal)
                .with_input("snapshot", snapshot)
                .with_created(CreatedResource::named(
                    ResourceKind::Journey,
                    journey.id.as_u32(),
                    &journey.name,
                ));
            Ok(renderer.result(&result))
        }

        Commands::ListJourneys { goal } => {
            let client = client(config)?;
            let ctx = session_store()?.load()?;
            let goal = goal.map(GoalId).or(ctx.goal_id).ok_or_else(no_goal)?;
            let orch = orchestrator(client.clone())?;
            let snapshot = match ctx.snapshot_id {
                Some(s) if ctx.goal_id == Some(goal) => s,
                _ => orch.resolve_snapshot(goal).await?,
            };
            let journeys = client.list_journeys(goal, snapshot).await?;
            let mut table = Table::new(&["id", "name"]);
            for j in &journeys {
                table.push(vec![j.id.to_string(), j.name.clone()]);
            }
            let payload = serde_json::to_value(&journeys)
                .map_err(|e| PlatformError::internal(e.to_string()))?;
            Ok(renderer.listing("list-journeys", &table, &payload))
        }

        // ── Checkpoints ─────────────────────────────────────────────
        Commands::CreateCheckpoint {
            title,
            journey,
            position,
        } => {
            let client = client(config)?;
            let ctx = session_store()?.load()?;
            let journey = journey.map(JourneyId).or(ctx.journey_id).ok_or_else(|| {
                PlatformError::validation("no journey in scope")
                    .with_hint("pass --journey or run `api-cli set-context --journey <id>`")
            })?;
            let checkpoint = client.create_checkpoint(&title).await?;
            // Never hand back a checkpoint id without attaching it.
            client
                .attach_checkpoint(journey, checkpoint.id, position.unwrap_or(1))
                .await?;
            update_session(|ctx| {
                ctx.set(ContextUpdate {
                    journey_id: Some(journey),
                    checkpoint_id: Some(checkpoint.id),
                    ..Default::default()
                });
            })?;
            let result = OperationResult::new("create-checkpoint")
                .with_input("journey", journey)
                .with_created(CreatedResource::named(
                    ResourceKind::Checkpoint,
                    checkpoint.id.as_u32(),
                    &checkpoint.title,
                ));
            Ok(renderer.result(&result))
        }

        Commands::ListCheckpoints { journey } => {
            let client = client(config)?;
            let ctx = session_store()?.load()?;
            let journey = journey.map(JourneyId).or(ctx.journey_id).ok_or_else(|| {
                PlatformError::validation("no journey in scope")
                    .with_hint("pass a journey id or run `api-cli set-context --journey <id>`")
            })?;
            let checkpoints = client.list_checkpoints(journey).await?;
            let mut table = Table::new(&["id", "title", "position"]);
            for c in &checkpoints {
                table.push(vec![
                    c.id.to_string(),
                    c.title.clone(),
                    c.position.map(|p| p.to_string()).unwrap_or_default(),
                ]);
            }
            let payload = serde_json::to_value(&checkpoints)
                .map_err(|e| PlatformError::internal(e.to_string()))?;
            Ok(renderer.listing("list-checkpoints", &table, &payload))
        }

        // ── Steps ───────────────────────────────────────────────────
        Commands::CreateStep {
            primitive,
            args,
            checkpoint,
        } => {
            let spec = vq_catalog::describe(&primitive)?;
            let (args, explicit_position, positional_checkpoint) =
                steps::split_step_args(&spec, &args);

            let session = session_store()?;
            let mut ctx = session.load()?;
            let target =
                ctx.resolve_checkpoint(checkpoint.map(CheckpointId), positional_checkpoint)?;
            let position = ctx.resolve_position(explicit_position);

            let payload = vq_catalog::apply(
                &primitive,
                &args,
                &vq_catalog::Options::new(),
                vq_catalog::StepContext::new(target, position)?,
            )?;

            let client = client(config)?;
            let created = client.add_step(&payload).await?;

            // The counter only tracks the session's own checkpoint.
            if ctx.checkpoint_id == Some(target) {
                ctx.record_step(position, explicit_position.is_some());
                session.save(&ctx)?;
            }

            let result = OperationResult::new(format!("create-step-{primitive}"))
                .with_input("checkpoint", target)
                .with_input("position", position)
                .with_created(CreatedResource::new(
                    ResourceKind::Step,
                    created.id.as_u32(),
                ));
            Ok(renderer.result(&result))
        }

        Commands::ListSteps => {
            let mut table = Table::new(&["name", "usage"]);
            let mut payload = Vec::new();
            for kind in StepKind::all() {
                let spec = kind.spec();
                table.push(vec![spec.name.to_string(), usage(&spec)]);
                payload.push(serde_json::json!({
                    "name": spec.name,
                    "required": spec.required.iter().map(|a| a.name).collect::<Vec<_>>(),
                    "optional": spec.optional.iter().map(|a| a.name).collect::<Vec<_>>(),
                }));
            }
            Ok(renderer.listing("list-steps", &table, &serde_json::Value::Array(payload)))
        }

        Commands::DescribeStep { name } => {
            let spec = vq_catalog::describe(&name)?;
            let mut table = Table::new(&["argument", "kind", "required"]);
            for a in spec.required {
                table.push(vec![a.name.into(), format!("{:?}", a.kind), "yes".into()]);
            }
            for a in spec.optional {
                table.push(vec![a.name.into(), format!("{:?}", a.kind), "no".into()]);
            }
            let payload = serde_json::json!({
                "name": spec.name,
                "usage": usage(&spec),
                "required": spec.required.iter().map(|a| a.name).collect::<Vec<_>>(),
                "optional": spec.optional.iter().map(|a| a.name).collect::<Vec<_>>(),
            });
            Ok(renderer.listing(&format!("describe-step {name}"), &table, &payload))
        }

        // ── Context ─────────────────────────────────────────────────
        Commands::SetContext {
            project,
            goal,
            snapshot,
            journey,
            checkpoint,
            position,
        } => {
            let session = session_store()?;
            let mut ctx = session.load()?;
            ctx.set(ContextUpdate {
                project_id: project.map(ProjectId),
                goal_id: goal.map(GoalId),
                snapshot_id: snapshot.map(SnapshotId),
                journey_id: journey.map(JourneyId),
                checkpoint_id: checkpoint.map(CheckpointId),
                next_position: position,
            });
            session.save(&ctx)?;
            let result = context_result("set-context", &ctx);
            Ok(renderer.result(&result))
        }

        Commands::ShowContext => {
            let session = session_store()?;
            let ctx = session.load()?;
            let result = context_result("show-context", &ctx);
            Ok(renderer.result(&result))
        }

        Commands::ClearContext => {
            let session = session_store()?;
            session.clear()?;
            Ok(renderer.result(&OperationResult::new("clear-context")))
        }

        // ── Workflows ───────────────────────────────────────────────
        Commands::CreateStructure {
            file,
            dry_run,
            run_id,
            continue_run,
            on_failure,
        } => {
            let source = read_file(&file)?;
            let structure = Structure::from_yaml(&source)?;
            if dry_run {
                let plan = plan_structure(&structure);
                return Ok(render_plan(&plan, renderer));
            }
            // One run id serves both the client tag (retryable creates,
            // cleanup by `run:<id>`) and the orchestrator's resume file.
            let (resume, run_id) = resolve_run(continue_run, run_id);
            let client = client(config)?.tagged(&run_id);
            let orch = orchestrator(client)?.with_cancel(CancelToken::from_ctrl_c());
            let opts = RunOptions {
                resume,
                run_id: Some(run_id),
                failure_policy: parse_failure_policy(&on_failure)?,
            };
            let outcome = orch.create_structure(&structure, &opts).await?;
            let result = outcome
                .result
                .with_input("state_file", outcome.state_path.display());
            Ok(renderer.result(&result))
        }

        Commands::RunTest {
            file,
            checkpoint,
            dry_run,
            run_id,
            continue_run,
        } => {
            let source = read_file(&file)?;
            let compiled = vq_dialect::compile(&source)?;
            if dry_run {
                let plan = plan_structure(&scenario_structure(&compiled.doc));
                return Ok(render_plan(&plan, renderer));
            }
            let (resume, run_id) = resolve_run(continue_run, run_id);
            let client = client(config)?.tagged(&run_id);
            let orch = orchestrator(client)?.with_cancel(CancelToken::from_ctrl_c());
            let opts = RunOptions {
                resume,
                run_id: Some(run_id),
                failure_policy: FailurePolicy::default(),
            };

            let session = session_store()?;
            let ctx = session.load()?;
            let target = checkpoint.map(CheckpointId);
            let start_position = match target {
                Some(t) if ctx.checkpoint_id == Some(t) => ctx.next_position,
                _ => 1,
            };

            let mut outcome = orch
                .run_test(&compiled.doc, target, start_position, &opts)
                .await?;
            outcome.result.warnings.splice(0..0, compiled.warnings);
            let result = outcome
                .result
                .with_input("dialect", compiled.dialect)
                .with_input("state_file", outcome.state_path.display());
            Ok(renderer.result(&result))
        }

        Commands::ExecuteGoal {
            goal,
            snapshot,
            wait,
            timeout_mins,
        } => {
            let client = client(config)?;
            let ctx = session_store()?.load()?;
            let goal = goal.map(GoalId).or(ctx.goal_id).ok_or_else(no_goal)?;
            let orch = orchestrator(client)?.with_cancel(CancelToken::from_ctrl_c());
            let poll = wait.then(|| PollConfig {
                timeout: std::time::Duration::from_secs(timeout_mins * 60),
                ..PollConfig::default()
            });
            let result = orch
                .execute_goal(goal, snapshot.map(SnapshotId), poll)
                .await?;
            Ok(renderer.result(&result))
        }

        Commands::GetExecution { execution } => {
            let client = client(config)?;
            let execution = client.get_execution(ExecutionId(execution)).await?;
            let mut table = Table::new(&["id", "status"]);
            table.push(vec![
                execution.id.to_string(),
                format!("{:?}", execution.status).to_lowercase(),
            ]);
            let payload = serde_json::to_value(&execution)
                .map_err(|e| PlatformError::internal(e.to_string()))?;
            Ok(renderer.listing("get-execution", &table, &payload))
        }

        Commands::Cleanup {
            tag,
            name_prefix,
            dry_run,
        } => {
            let client = client(config)?;
            let orch = orchestrator(client)?.with_cancel(CancelToken::from_ctrl_c());
            let filter = CleanupFilter { tag, name_prefix };
            let (result, plan) = orch.cleanup(&filter, dry_run).await?;
            if dry_run {
                return Ok(render_plan(&plan, renderer));
            }
            Ok(renderer.result(&result))
        }

        // ── Dialect tooling ─────────────────────────────────────────
        Commands::Convert { file, to } => {
            let source = read_file(&file)?;
            let target: vq_dialect::Dialect = to.parse()?;
            let compiled = vq_dialect::compile(&source)?;
            let (text, render_warnings) = vq_dialect::render(&compiled.doc, target)?;
            let mut out = String::new();
            for w in compiled.warnings.iter().chain(render_warnings.iter()) {
                out.push_str(&format!("# warning: {w}\n"));
            }
            out.push_str(&text);
            Ok(out)
        }

        Commands::Validate { file } => {
            let source = read_file(&file)?;
            let compiled = vq_dialect::compile(&source)?;
            // Lower every step so argument problems surface here, not at
            // run time.
            for step in compiled.doc.steps_in_order() {
                let invocation = step.to_invocation()?;
                vq_catalog::build(invocation.kind, &invocation.args, &invocation.options)?;
            }
            let mut result = OperationResult::new("validate")
                .with_input("dialect", compiled.dialect)
                .with_input("confidence", format!("{:.2}", compiled.confidence))
                .with_input("steps", compiled.doc.step_count());
            result.warnings = compiled.warnings;
            Ok(renderer.result(&result))
        }

        Commands::ValidateConfig { probe } => {
            let errors = config.validate();
            if !errors.is_empty() {
                return Err(PlatformError::validation(errors.join("; ")));
            }
            let mut result = OperationResult::new("validate-config")
                .with_input("base_url", &config.base_url)
                .with_input("organization", &config.organization_id);
            if let Some(path) = &config.file_path {
                result = result.with_input("config_file", path.display());
            }
            if probe {
                let client = client(config)?;
                let projects = client.list_projects().await?;
                result = result.with_input("probe", format!("ok ({} projects)", projects.len()));
            }
            Ok(renderer.result(&result))
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn client(config: &Config) -> Result<HttpPlatformClient, PlatformError> {
    config.ensure_valid()?;
    let client_config = ClientConfig::new(
        &config.api_token,
        &config.organization_id,
        &config.client_id,
        &config.client_name,
    )
    .with_base_url(&config.base_url);
    HttpPlatformClient::new(client_config)
}

fn orchestrator(client: HttpPlatformClient) -> Result<Orchestrator, PlatformError> {
    Ok(Orchestrator::new(
        Arc::new(client),
        RunStateStore::open_default()?,
    ))
}

fn session_store() -> Result<SessionStore, PlatformError> {
    SessionStore::open_default().map_err(Into::into)
}

/// Settle a workflow's run id before any client is built: `--continue`
/// resumes under its own id, an explicit `--run-id` is kept, and
/// otherwise a fresh id is generated. The caller tags the client and the
/// run options with the same id.
fn resolve_run(continue_run: Option<String>, run_id: Option<String>) -> (bool, String) {
    let resume = continue_run.is_some();
    let run_id = continue_run.or(run_id).unwrap_or_else(generate_run_id);
    (resume, run_id)
}

fn update_session(
    mutate: impl FnOnce(&mut vq_session::SessionContext),
) -> Result<(), PlatformError> {
    let store = session_store()?;
    let mut ctx = store.load()?;
    mutate(&mut ctx);
    store.save(&ctx).map_err(Into::into)
}

fn context_result(operation: &str, ctx: &vq_session::SessionContext) -> OperationResult {
    let mut result = OperationResult::new(operation);
    if let Some(id) = ctx.project_id {
        result = result.with_input("project", id);
    }
    if let Some(id) = ctx.goal_id {
        result = result.with_input("goal", id);
    }
    if let Some(id) = ctx.snapshot_id {
        result = result.with_input("snapshot", id);
    }
    if let Some(id) = ctx.journey_id {
        result = result.with_input("journey", id);
    }
    if let Some(id) = ctx.checkpoint_id {
        result = result.with_input("checkpoint", id);
    }
    result.with_input("next_position", ctx.next_position)
}

fn read_file(path: &std::path::Path) -> Result<String, PlatformError> {
    std::fs::read_to_string(path).map_err(|e| {
        PlatformError::validation(format!("cannot read {}: {e}", path.display()))
    })
}

fn render_plan(plan: &vq_orchestrator::Plan, renderer: &Renderer) -> String {
    let mut result = OperationResult::new("dry-run").with_input("calls", plan.len());
    result.remote_payload = Some(serde_json::Value::Array(
        plan.calls()
            .iter()
            .map(|c| serde_json::json!({"operation": c.operation, "detail": c.detail}))
            .collect(),
    ));
    let rendered = renderer.result(&result);
    format!("{rendered}\n{plan}")
}

fn usage(spec: &vq_catalog::StepSpec) -> String {
    let mut out = String::from(spec.name);
    for a in spec.required {
        out.push_str(&format!(" <{}>", a.name));
    }
    for a in spec.optional {
        out.push_str(&format!(" [{}]", a.name));
    }
    out
}

fn parse_failure_policy(raw: &str) -> Result<FailurePolicy, PlatformError> {
    match raw {
        "stop" => Ok(FailurePolicy::StopOnFirst),
        "continue" => Ok(FailurePolicy::Continue),
        other => match other.strip_prefix("max-consecutive:") {
            Some(n) => n
                .parse::<u32>()
                .map(FailurePolicy::MaxConsecutive)
                .map_err(|_| {
                    PlatformError::validation(format!("invalid failure policy '{other}'"))
                }),
            None => Err(PlatformError::validation(format!(
                "invalid failure policy '{other}' (expected stop, continue or max-consecutive:<n>)"
            ))),
        },
    }
}

fn no_goal() -> PlatformError {
    PlatformError::validation("no goal in scope")
        .with_hint("pass a goal id or run `api-cli set-context --goal <id>`")
}
