//! Caller-side value objects and the request bodies they produce.
//!
//! A [`Project`] or [`Repository`] describes the *desired* identity of a
//! resource. It is constructed by the caller, handed once to the façade and
//! then discarded; nothing here is persisted.

use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::{DevOpsError, ProcessTemplateId, ProjectId, ProjectKey, ProjectName, RepositoryName};

// ---------------------------------------------------------------------------
// Source control
// ---------------------------------------------------------------------------

/// Version control system of a new project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceControlType {
    Git,
    Tfvc,
}

impl std::fmt::Display for SourceControlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Git => f.write_str("Git"),
            Self::Tfvc => f.write_str("Tfvc"),
        }
    }
}

/// Returned when a string names neither `Git` nor `Tfvc`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown source control type '{0}' (expected Git or Tfvc)")]
pub struct ParseSourceControlError(String);

impl FromStr for SourceControlType {
    type Err = ParseSourceControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "git" => Ok(Self::Git),
            "tfvc" => Ok(Self::Tfvc),
            _ => Err(ParseSourceControlError(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Fallback capabilities applied to a [`Project`] that does not set its own.
///
/// Usually populated from `SOURCE_CONTROL_TYPE` and `TEMPLATE_TYPE_ID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectDefaults {
    pub source_control: Option<SourceControlType>,
    pub process_template: Option<ProcessTemplateId>,
}

/// The desired identity of a team project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: ProjectName,
    description: String,
    source_control: Option<SourceControlType>,
    process_template: Option<ProcessTemplateId>,
}

impl Project {
    /// A project with an empty description and capabilities left to the
    /// façade's [`ProjectDefaults`].
    pub fn new(name: ProjectName) -> Self {
        Self {
            name,
            description: String::new(),
            source_control: None,
            process_template: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_source_control(mut self, source_control: SourceControlType) -> Self {
        self.source_control = Some(source_control);
        self
    }

    pub fn with_process_template(mut self, template: ProcessTemplateId) -> Self {
        self.process_template = Some(template);
        self
    }

    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Builds the `POST _apis/projects` body.
    ///
    /// Capabilities set on the project win over `defaults`. Fails if either
    /// the source control type or the process template is still unknown.
    pub fn create_request(
        &self,
        defaults: &ProjectDefaults,
    ) -> Result<CreateProjectRequest, DevOpsError> {
        let source_control_type = self
            .source_control
            .or(defaults.source_control)
            .ok_or_else(|| self.invalid("no source control type (set SOURCE_CONTROL_TYPE)"))?;
        let template_type_id = self
            .process_template
            .or(defaults.process_template)
            .ok_or_else(|| self.invalid("no process template id (set TEMPLATE_TYPE_ID)"))?;

        Ok(CreateProjectRequest {
            name: self.name.to_string(),
            description: self.description.clone(),
            capabilities: ProjectCapabilities {
                versioncontrol: VersionControlCapability {
                    source_control_type,
                },
                process_template: ProcessTemplateCapability { template_type_id },
            },
        })
    }

    fn invalid(&self, reason: &str) -> DevOpsError {
        DevOpsError::InvalidProject {
            name: self.name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Body of `POST _apis/projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: String,
    pub capabilities: ProjectCapabilities,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCapabilities {
    pub versioncontrol: VersionControlCapability,
    #[serde(rename = "processTemplate")]
    pub process_template: ProcessTemplateCapability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionControlCapability {
    pub source_control_type: SourceControlType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTemplateCapability {
    pub template_type_id: ProcessTemplateId,
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

/// The project a repository belongs to: by id, by name, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    Id(ProjectId),
    Name(ProjectName),
    IdAndName(ProjectId, ProjectName),
}

impl ProjectRef {
    pub fn by_id(id: ProjectId) -> Self {
        Self::Id(id)
    }

    pub fn by_name(name: ProjectName) -> Self {
        Self::Name(name)
    }

    pub fn both(id: ProjectId, name: ProjectName) -> Self {
        Self::IdAndName(id, name)
    }

    pub fn id(&self) -> Option<ProjectId> {
        match self {
            Self::Id(id) | Self::IdAndName(id, _) => Some(*id),
            Self::Name(_) => None,
        }
    }

    pub fn name(&self) -> Option<&ProjectName> {
        match self {
            Self::Name(name) | Self::IdAndName(_, name) => Some(name),
            Self::Id(_) => None,
        }
    }

    /// Key used to scope lookups; the id wins when both are known.
    pub fn key(&self) -> ProjectKey {
        match self {
            Self::Id(id) | Self::IdAndName(id, _) => ProjectKey::Id(*id),
            Self::Name(name) => ProjectKey::Name(name.clone()),
        }
    }
}

// Wire form: `{"id": ..., "name": ...}` with absent members omitted.
impl Serialize for ProjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            id: Option<ProjectId>,
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<&'a ProjectName>,
        }

        Body {
            id: self.id(),
            name: self.name(),
        }
        .serialize(serializer)
    }
}

impl From<ProjectKey> for ProjectRef {
    fn from(key: ProjectKey) -> Self {
        match key {
            ProjectKey::Id(id) => Self::by_id(id),
            ProjectKey::Name(name) => Self::by_name(name),
        }
    }
}

/// The desired identity of a Git repository inside a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    name: RepositoryName,
    project: ProjectRef,
}

impl Repository {
    pub fn new(name: RepositoryName, project: ProjectRef) -> Self {
        Self { name, project }
    }

    pub fn name(&self) -> &RepositoryName {
        &self.name
    }

    pub fn project(&self) -> &ProjectRef {
        &self.project
    }

    /// Builds the `POST _apis/git/repositories` body.
    pub fn create_request(&self) -> CreateRepositoryRequest {
        CreateRepositoryRequest {
            name: self.name.to_string(),
            project: self.project.clone(),
        }
    }
}

/// Body of `POST _apis/git/repositories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRepositoryRequest {
    pub name: String,
    pub project: ProjectRef,
}
