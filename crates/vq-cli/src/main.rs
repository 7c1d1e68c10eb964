// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]

//! `api-cli` — command-line client for the Virtuoso test-automation
//! platform.
//!
//! Argument parsing and dispatch live here; everything substantial (the
//! step catalog, session store, workflows, dialect compiler, renderer)
//! lives in the `vq-*` crates.

mod commands;
mod steps;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vq_format::{OutputFormat, Renderer};

#[derive(Parser, Debug)]
#[command(name = "api-cli", version, about = "Virtuoso test-automation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: human | json | yaml | ai.
    #[arg(long, global = true)]
    output: Option<String>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    verbose: bool,

    /// Override the platform base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Override the API token.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Override the organization id.
    #[arg(long, global = true)]
    organization: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Create a project.
    CreateProject {
        /// Display name.
        name: String,
    },

    /// List the organization's projects.
    ListProjects,

    /// Create a goal (and its implicit initial journey).
    CreateGoal {
        /// Display name.
        name: String,
        /// Application URL the goal tests.
        url: Option<String>,
        /// Owning project; defaults to the session's current project.
        #[arg(long)]
        project_id: Option<u32>,
    },

    /// List a project's goals.
    ListGoals {
        /// Project id; defaults to the session's current project.
        project_id: Option<u32>,
    },

    /// Create a journey under a goal.
    CreateJourney {
        /// Display name.
        name: String,
        /// Goal id; defaults to the session's current goal.
        #[arg(long)]
        goal: Option<u32>,
        /// Snapshot id; resolved from the goal when omitted.
        #[arg(long)]
        snapshot: Option<u32>,
    },

    /// List a goal's journeys.
    ListJourneys {
        /// Goal id; defaults to the session's current goal.
        goal: Option<u32>,
    },

    /// Create a checkpoint and attach it to a journey.
    CreateCheckpoint {
        /// Display title.
        title: String,
        /// Journey id; defaults to the session's current journey.
        #[arg(long)]
        journey: Option<u32>,
        /// Position within the journey (default: appended at 1).
        #[arg(long)]
        position: Option<u32>,
    },

    /// List a journey's checkpoints.
    ListCheckpoints {
        /// Journey id; defaults to the session's current journey.
        journey: Option<u32>,
    },

    /// Add a step. Also invocable as `create-step-<primitive>`.
    CreateStep {
        /// Primitive name (see `list-steps`).
        primitive: String,
        /// Positional arguments; trailing integers are position and
        /// checkpoint id.
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
        /// Target checkpoint; wins over positionals and the session.
        #[arg(long)]
        checkpoint: Option<u32>,
    },

    /// Show the step primitive catalog.
    ListSteps,

    /// Describe one step primitive.
    DescribeStep {
        /// Primitive name.
        name: String,
    },

    /// Persist current ids for subsequent commands.
    SetContext {
        /// Current project.
        #[arg(long)]
        project: Option<u32>,
        /// Current goal.
        #[arg(long)]
        goal: Option<u32>,
        /// Pinned snapshot.
        #[arg(long)]
        snapshot: Option<u32>,
        /// Current journey.
        #[arg(long)]
        journey: Option<u32>,
        /// Current checkpoint (resets the position counter).
        #[arg(long)]
        checkpoint: Option<u32>,
        /// Next step position.
        #[arg(long)]
        position: Option<u32>,
    },

    /// Print the current session context.
    ShowContext,

    /// Delete the session file.
    ClearContext,

    /// Build a whole project tree from a structure document.
    CreateStructure {
        /// Structure YAML file.
        #[arg(short, long)]
        file: std::path::PathBuf,
        /// Print the plan without calling the platform.
        #[arg(long)]
        dry_run: bool,
        /// Tag created resources with this run id.
        #[arg(long)]
        run_id: Option<String>,
        /// Resume a previous run from its state file.
        #[arg(long = "continue", value_name = "RUN_ID")]
        continue_run: Option<String>,
        /// Failure policy: stop | continue | max-consecutive:<n>.
        #[arg(long, default_value = "max-consecutive:3")]
        on_failure: String,
    },

    /// Compile a YAML test (any dialect) and run it.
    RunTest {
        /// Test YAML file.
        #[arg(short, long)]
        file: std::path::PathBuf,
        /// Target checkpoint; auto-creates a tree when omitted.
        #[arg(long)]
        checkpoint: Option<u32>,
        /// Print the plan without calling the platform.
        #[arg(long)]
        dry_run: bool,
        /// Tag created resources with this run id.
        #[arg(long)]
        run_id: Option<String>,
        /// Resume a previous run from its state file.
        #[arg(long = "continue", value_name = "RUN_ID")]
        continue_run: Option<String>,
    },

    /// Execute a goal snapshot server-side.
    ExecuteGoal {
        /// Goal id; defaults to the session's current goal.
        goal: Option<u32>,
        /// Snapshot id; resolved from the goal when omitted.
        #[arg(long)]
        snapshot: Option<u32>,
        /// Poll until the execution finishes.
        #[arg(long)]
        wait: bool,
        /// Poll budget in minutes.
        #[arg(long, default_value_t = 30)]
        timeout_mins: u64,
    },

    /// Fetch an execution's status.
    GetExecution {
        /// Execution id.
        execution: u32,
    },

    /// Delete resources matching a tag or name prefix.
    Cleanup {
        /// Match resources tagged with this tag (e.g. run:abc123).
        #[arg(long)]
        tag: Option<String>,
        /// Match resources whose name starts with this prefix.
        #[arg(long)]
        name_prefix: Option<String>,
        /// Print what would be deleted without deleting.
        #[arg(long)]
        dry_run: bool,
    },

    /// Convert a YAML test between dialects.
    Convert {
        /// Test YAML file.
        #[arg(short, long)]
        file: std::path::PathBuf,
        /// Target dialect: compact | simplified | extended.
        #[arg(long)]
        to: String,
    },

    /// Compile a YAML test and report warnings without running it.
    Validate {
        /// Test YAML file.
        #[arg(short, long)]
        file: std::path::PathBuf,
    },

    /// Check configuration completeness (and optionally the token).
    ValidateConfig {
        /// Issue a ListProjects probe with the configured credentials.
        #[arg(long)]
        probe: bool,
    },
}

#[tokio::main]
async fn main() {
    // `create-step-<primitive>` is sugar for `create-step <primitive>`.
    let argv = steps::rewrite_step_alias(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    let filter = if cli.verbose {
        EnvFilter::new("vq=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vq=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let overrides = vq_config::Overrides {
        base_url: cli.base_url.clone(),
        api_token: cli.token.clone(),
        organization_id: cli.organization.clone(),
        output_format: cli.output.clone(),
    };

    let (format, outcome) = commands::dispatch(cli.command, overrides).await;
    let renderer = Renderer::new(format);
    match outcome {
        Ok(text) => {
            if !text.is_empty() {
                println!("{text}");
            }
        }
        Err(err) => {
            eprintln!("{}", renderer.error(&err));
            std::process::exit(err.exit_code());
        }
    }
}

/// Parse the output format, falling back to human on bad input.
pub(crate) fn output_format(requested: Option<&str>) -> OutputFormat {
    requested
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_create_step_with_negative_args() {
        let cli = Cli::parse_from([
            "api-cli",
            "create-step",
            "mouse-move-by",
            "-10",
            "-5",
            "3",
        ]);
        match cli.command {
            Commands::CreateStep {
                primitive, args, ..
            } => {
                assert_eq!(primitive, "mouse-move-by");
                assert_eq!(args, vec!["-10", "-5", "3"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_continue_flag() {
        let cli = Cli::parse_from([
            "api-cli",
            "create-structure",
            "--file",
            "tree.yaml",
            "--continue",
            "r42",
        ]);
        match cli.command {
            Commands::CreateStructure { continue_run, .. } => {
                assert_eq!(continue_run.as_deref(), Some("r42"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn output_format_falls_back_to_human() {
        assert_eq!(output_format(Some("json")), OutputFormat::Json);
        assert_eq!(output_format(Some("nope")), OutputFormat::Human);
        assert_eq!(output_format(None), OutputFormat::Human);
    }
}
