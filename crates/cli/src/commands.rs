//! Subcommand implementations.
//!
//! Each command talks only to the [`DevOps`] façade and prints either a short
//! human-readable summary or the platform's resource as pretty JSON.

use anyhow::{anyhow, bail, Context};
use domain::{
    DevOpsError, GitRepository, OperationId, Project, ProjectId, ProjectKey, ProjectName, ProjectRef,
    ProcessTemplateId, Repository, RepositoryName, SourceControlType, TeamProject,
    TeamProjectReference,
};
use facade::{DevOps, ProjectOutcome, RepositoryOutcome};
use serde::Serialize;

use crate::OutputFormat;

pub async fn list_projects(devops: &DevOps, format: OutputFormat) -> anyhow::Result<()> {
    let projects = devops.get_existing_projects().await?;

    match format {
        OutputFormat::Json => print_json(&projects.values().collect::<Vec<_>>()),
        OutputFormat::Text => {
            if projects.is_empty() {
                println!("No projects found.");
            }
            for project in projects.values() {
                println!("{}", project_line(project));
            }
            Ok(())
        }
    }
}

pub async fn show_project(
    devops: &DevOps,
    project: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let key = ProjectKey::parse(project).ok_or_else(|| anyhow!("project must not be empty"))?;
    let project = match devops.get_project(&key).await {
        Err(DevOpsError::Api(e)) if e.is_not_found() => bail!("project '{key}' does not exist"),
        result => result?,
    };

    match format {
        OutputFormat::Json => print_json(&project),
        OutputFormat::Text => {
            print_team_project(&project);
            Ok(())
        }
    }
}

pub async fn ensure_project(
    devops: &DevOps,
    name: &str,
    description: &str,
    source_control: Option<SourceControlType>,
    template: Option<ProcessTemplateId>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let name = ProjectName::new(name).ok_or_else(|| anyhow!("project name must not be empty"))?;
    let mut project = Project::new(name).with_description(description);
    if let Some(source_control) = source_control {
        project = project.with_source_control(source_control);
    }
    if let Some(template) = template {
        project = project.with_process_template(template);
    }

    let outcome = devops
        .find_or_create_project(&project)
        .await
        .with_context(|| format!("could not find or create project '{}'", project.name()))?;

    if let OutputFormat::Json = format {
        return print_json(&outcome);
    }
    match &outcome {
        ProjectOutcome::Existing(found) => println!("exists   {}", project_line(found)),
        ProjectOutcome::Created(created) => println!("created  {}", project_line(&created.reference)),
        ProjectOutcome::Queued(operation) => {
            println!("queued   operation {} ({})", operation.id, operation.status)
        }
    }
    Ok(())
}

pub async fn list_repositories(
    devops: &DevOps,
    project: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let key = project
        .map(|p| ProjectKey::parse(p).ok_or_else(|| anyhow!("project must not be empty")))
        .transpose()?;
    let repositories = devops.get_existing_repositories(key.as_ref()).await?;

    match format {
        OutputFormat::Json => print_json(&repositories.values().collect::<Vec<_>>()),
        OutputFormat::Text => {
            if repositories.is_empty() {
                println!("No repositories found.");
            }
            for repository in repositories.values() {
                println!("{}", repository_line(repository));
            }
            Ok(())
        }
    }
}

pub async fn ensure_repository(
    devops: &DevOps,
    name: &str,
    project_id: Option<ProjectId>,
    project_name: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let name =
        RepositoryName::new(name).ok_or_else(|| anyhow!("repository name must not be empty"))?;
    let project_name = project_name
        .map(|n| ProjectName::new(n).ok_or_else(|| anyhow!("project name must not be empty")))
        .transpose()?;
    let project = match (project_id, project_name) {
        (Some(id), Some(name)) => ProjectRef::both(id, name),
        (Some(id), None) => ProjectRef::by_id(id),
        (None, Some(name)) => ProjectRef::by_name(name),
        (None, None) => return Err(anyhow!("a project id or project name is required")),
    };
    let repository = Repository::new(name, project);

    let outcome = devops
        .find_or_create_repository(&repository)
        .await
        .with_context(|| format!("could not find or create repository '{}'", repository.name()))?;

    if let OutputFormat::Json = format {
        return print_json(&outcome);
    }
    match &outcome {
        RepositoryOutcome::Existing(repo) => println!("exists   {}", repository_line(repo)),
        RepositoryOutcome::Created(repo) => println!("created  {}", repository_line(repo)),
    }
    Ok(())
}

pub async fn operation_status(
    devops: &DevOps,
    id: OperationId,
    wait: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let status = if wait {
        devops.wait_for_operation(id).await?
    } else {
        devops.get_operation_status(id).await?
    };

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "id": id, "status": status })),
        OutputFormat::Text => {
            println!("{id}  {status}");
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn project_line(project: &TeamProjectReference) -> String {
    format!("{:<40} {}  {:?}", project.name, project.id, project.state)
}

fn repository_line(repository: &GitRepository) -> String {
    let remote = repository.remote_url.as_deref().unwrap_or("-");
    format!("{:<40} {}  {}", repository.name, repository.id, remote)
}

fn print_team_project(project: &TeamProject) {
    let reference = &project.reference;
    println!("Name:        {}", reference.name);
    println!("Id:          {}", reference.id);
    println!("State:       {:?}", reference.state);
    if let Some(description) = reference.description.as_deref().filter(|d| !d.is_empty()) {
        println!("Description: {description}");
    }
    if let Some(source_control) = project.source_control_type() {
        println!("Source:      {source_control}");
    }
    if let Some(team) = &project.default_team {
        println!("Team:        {}", team.name);
    }
    if let Some(updated) = reference.last_update_time {
        println!("Updated:     {updated}");
    }
}
