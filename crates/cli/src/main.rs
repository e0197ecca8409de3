//! devops-helper entry point.
//!
//! This binary is the composition root. It:
//!
//! 1. Loads `.env` from the working directory into the process environment.
//! 2. Wires `tracing` output (and optional OTLP export) via [`telemetry`].
//! 3. Resolves [`config::Settings`] from flags and environment.
//! 4. Builds the REST client, wraps it in the [`DevOps`] façade and runs the
//!    selected subcommand.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use azure::AzureDevOpsClient;
use clap::{Args, Parser, Subcommand};
use domain::{ApiError, DevOpsError, OperationId, ProcessTemplateId, ProjectId, SourceControlType};
use facade::{DevOps, PollPolicy};
use tracing::debug;

mod commands;
mod config;
mod telemetry;

use config::Settings;

#[derive(Parser)]
#[command(name = "devops-helper")]
#[command(author, version, about = "Find or create Azure DevOps projects and repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Log format written to stderr (text or json)
    #[arg(long, global = true, default_value = "text")]
    log_format: LogFormat,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Seconds to wait for a queued operation to finish
    #[arg(long, global = true, default_value_t = 30)]
    max_wait: u64,

    /// Seconds between operation status checks
    #[arg(long, global = true, default_value_t = 10)]
    poll_interval: u64,

    /// Return as soon as a create call is accepted instead of confirming it
    #[arg(long, global = true)]
    no_confirm: bool,
}

/// Connection flags; each falls back to its environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Organization name [env: org_name]
    #[arg(long, global = true)]
    pub org: Option<String>,

    /// Personal access token [env: personal_access_token]
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Service base URL [env: AZURE_DEVOPS_URL]
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List every project in the organization
    Projects,

    /// Work with a single project
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// List repositories, optionally within one project
    Repos {
        /// Project id or name
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Work with a single repository
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },

    /// Show the status of a queued operation
    Operation {
        /// Operation id
        id: OperationId,
        /// Poll until the operation finishes or --max-wait elapses
        #[arg(short, long)]
        wait: bool,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Return the named project, creating it if it does not exist
    Ensure {
        /// Project name
        name: String,
        /// Description used when the project is created
        #[arg(short, long, default_value = "")]
        description: String,
        /// Source control type (Git or Tfvc) [env: SOURCE_CONTROL_TYPE]
        #[arg(long)]
        source_control: Option<SourceControlType>,
        /// Process template id [env: TEMPLATE_TYPE_ID]
        #[arg(long)]
        template: Option<ProcessTemplateId>,
    },
    /// Show project details
    Show {
        /// Project id or name
        project: String,
    },
}

#[derive(Subcommand)]
enum RepoAction {
    /// Return the named repository, creating it if it does not exist
    #[command(group(
        clap::ArgGroup::new("owner")
            .required(true)
            .multiple(true)
            .args(["project_id", "project_name"])
    ))]
    Ensure {
        /// Repository name
        name: String,
        /// Id of the owning project
        #[arg(long)]
        project_id: Option<ProjectId>,
        /// Name of the owning project
        #[arg(long)]
        project_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to load .env");
        }
    }

    let cli = Cli::parse();
    let telemetry = telemetry::init(cli.log_format)?;

    let result = run(cli).await.map_err(with_token_hint);
    telemetry.shutdown();
    result
}

/// Points at the personal access token when the platform refused it.
fn with_token_hint(err: anyhow::Error) -> anyhow::Error {
    let unauthorized = err.chain().any(|cause| {
        match cause.downcast_ref::<DevOpsError>() {
            Some(DevOpsError::Api(api)) => api.is_unauthorized(),
            _ => cause
                .downcast_ref::<ApiError>()
                .is_some_and(ApiError::is_unauthorized),
        }
    });

    if unauthorized {
        err.context("access denied; check the personal access token and its scopes")
    } else {
        err
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::from_env(&cli.connection)?;
    debug!(?settings, "resolved settings");

    let client = AzureDevOpsClient::new(settings.connection)?;
    let devops = DevOps::new(Arc::new(client))
        .with_defaults(settings.defaults)
        .with_polling(PollPolicy::new(
            Duration::from_secs(cli.max_wait),
            Duration::from_secs(cli.poll_interval),
        ))
        .with_confirmation(!cli.no_confirm);

    let format = cli.format;
    match cli.command {
        Commands::Projects => commands::list_projects(&devops, format).await,
        Commands::Project { action } => match action {
            ProjectAction::Ensure {
                name,
                description,
                source_control,
                template,
            } => {
                commands::ensure_project(
                    &devops,
                    &name,
                    &description,
                    source_control,
                    template,
                    format,
                )
                .await
            }
            ProjectAction::Show { project } => {
                commands::show_project(&devops, &project, format).await
            }
        },
        Commands::Repos { project } => {
            commands::list_repositories(&devops, project.as_deref(), format).await
        }
        Commands::Repo { action } => match action {
            RepoAction::Ensure {
                name,
                project_id,
                project_name,
            } => {
                commands::ensure_repository(
                    &devops,
                    &name,
                    project_id,
                    project_name.as_deref(),
                    format,
                )
                .await
            }
        },
        Commands::Operation { id, wait } => {
            commands::operation_status(&devops, id, wait, format).await
        }
    }
}
