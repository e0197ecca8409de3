//! Results of the find-or-create operations.

use domain::{GitRepository, OperationReference, TeamProject, TeamProjectReference};
use serde::Serialize;

/// What [`crate::DevOps::find_or_create_project`] found or did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "resource", rename_all = "snake_case")]
pub enum ProjectOutcome {
    /// A project with the requested name already existed; nothing was created.
    Existing(TeamProjectReference),
    /// The project was created and its creation operation confirmed.
    Created(TeamProject),
    /// Creation was queued but not confirmed (confirmation disabled).
    Queued(OperationReference),
}

impl ProjectOutcome {
    /// Name of the resulting project; `None` while creation is only queued.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Existing(project) => Some(&project.name),
            Self::Created(project) => Some(&project.reference.name),
            Self::Queued(_) => None,
        }
    }

    /// Returns `true` if this call issued a create request.
    pub fn was_created(&self) -> bool {
        !matches!(self, Self::Existing(_))
    }
}

/// What [`crate::DevOps::find_or_create_repository`] found or did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "resource", rename_all = "snake_case")]
pub enum RepositoryOutcome {
    Existing(GitRepository),
    Created(GitRepository),
}

impl RepositoryOutcome {
    pub fn repository(&self) -> &GitRepository {
        match self {
            Self::Existing(repo) | Self::Created(repo) => repo,
        }
    }

    pub fn into_repository(self) -> GitRepository {
        match self {
            Self::Existing(repo) | Self::Created(repo) => repo,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}
