//! Platform resources as returned by the Azure DevOps REST API.
//!
//! These are the "vendor-native result objects" of the façade: field names
//! follow the platform's camelCase JSON, optional fields are `Option` because
//! different endpoints return different subsets (a repository's embedded
//! project carries fewer fields than `GET _apis/projects/{id}`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ContinuationToken, OperationId, ProjectId, RepositoryId, Timestamp};

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Lifecycle state of a team project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectState {
    New,
    CreatePending,
    WellFormed,
    Deleting,
    Deleted,
    Unchanged,
    All,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Who can see a team project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectVisibility {
    Private,
    Public,
    #[serde(other)]
    Unknown,
}

/// Summary form of a team project, as returned by project listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProjectReference {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub state: ProjectState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<ProjectVisibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<Timestamp>,
}

/// Reference to a team (used for a project's default team).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebApiTeamRef {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Full form of a team project, as returned by `GET _apis/projects/{project}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProject {
    #[serde(flatten)]
    pub reference: TeamProjectReference,
    /// Capability groups, e.g. `versioncontrol.sourceControlType = "Git"`.
    #[serde(default)]
    pub capabilities: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_team: Option<WebApiTeamRef>,
}

impl TeamProject {
    /// The project's version control system, if the capability was returned.
    pub fn source_control_type(&self) -> Option<&str> {
        self.capabilities
            .get("versioncontrol")
            .and_then(|group| group.get("sourceControlType"))
            .map(String::as_str)
    }
}

/// One page of a project listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectPage {
    pub projects: Vec<TeamProjectReference>,
    /// Cursor for the next page; `None` on the last page.
    pub continuation_token: Option<ContinuationToken>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Status of a long-running platform operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    NotSet,
    Queued,
    InProgress,
    Cancelled,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl OperationStatus {
    /// Returns `true` once the operation will not change status again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Cancelled | Self::Failed)
    }

    /// Returns `true` for terminal statuses other than success.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Cancelled | Self::Failed)
    }

    /// The platform's wire name for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotSet => "notSet",
            Self::Queued => "queued",
            Self::InProgress => "inProgress",
            Self::Cancelled => "cancelled",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned when an operation is queued (e.g. project creation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReference {
    pub id: OperationId,
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<Uuid>,
}

/// Current state of an operation, as returned by `GET _apis/operations/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(flatten)]
    pub reference: OperationReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_message: Option<String>,
}

impl Operation {
    pub fn status(&self) -> OperationStatus {
        self.reference.status
    }
}

// ---------------------------------------------------------------------------
// Git repositories
// ---------------------------------------------------------------------------

/// A Git repository, as returned by the git listing, get and create endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    pub id: RepositoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<TeamProjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_disabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_project_decodes_flattened_reference_and_capabilities() {
        let json = r#"{
            "id": "eb6e4656-77fc-42a1-9181-4c6d8e9da5d1",
            "name": "Fabrikam-Fiber-TFVC",
            "description": "Team Foundation Version Control projects.",
            "url": "https://dev.azure.com/fabrikam/_apis/projects/eb6e4656-77fc-42a1-9181-4c6d8e9da5d1",
            "state": "wellFormed",
            "revision": 411,
            "visibility": "private",
            "lastUpdateTime": "2024-03-05T10:11:12.347Z",
            "capabilities": {
                "versioncontrol": { "sourceControlType": "Tfvc" },
                "processTemplate": { "templateName": "Agile", "templateTypeId": "adcc42ab-9882-485e-a3ed-7678f01f66bc" }
            },
            "defaultTeam": {
                "id": "66df9be7-3586-467b-9c5f-425b29afedfd",
                "name": "Fabrikam-Fiber-TFVC Team"
            }
        }"#;

        let project: TeamProject = serde_json::from_str(json).unwrap();
        assert_eq!(project.reference.name, "Fabrikam-Fiber-TFVC");
        assert_eq!(project.reference.state, ProjectState::WellFormed);
        assert_eq!(project.reference.visibility, Some(ProjectVisibility::Private));
        assert_eq!(project.source_control_type(), Some("Tfvc"));
        assert_eq!(
            project.default_team.map(|t| t.name),
            Some("Fabrikam-Fiber-TFVC Team".to_string())
        );
    }

    #[test]
    fn never_updated_projects_do_not_break_a_listing() {
        let json = r#"[
            {
                "id": "eb6e4656-77fc-42a1-9181-4c6d8e9da5d1",
                "name": "Legacy",
                "state": "wellFormed",
                "revision": 7,
                "lastUpdateTime": "0001-01-01T00:00:00"
            },
            {
                "id": "6ce954b1-ce1f-45d1-b94d-e6bf2464ba2c",
                "name": "Some Project",
                "state": "wellFormed",
                "lastUpdateTime": "2024-03-05T10:11:12.347Z"
            }
        ]"#;

        let projects: Vec<TeamProjectReference> = serde_json::from_str(json).unwrap();
        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Legacy", "Some Project"]);
        assert_eq!(
            projects[0].last_update_time.map(|t| t.to_string()),
            Some("0001-01-01T00:00:00Z".to_string())
        );
    }

    #[test]
    fn unknown_enum_values_do_not_fail_decoding() {
        let json = r#"{
            "id": "eb6e4656-77fc-42a1-9181-4c6d8e9da5d1",
            "name": "p",
            "state": "somethingNew",
            "visibility": "organization"
        }"#;
        let project: TeamProjectReference = serde_json::from_str(json).unwrap();
        assert_eq!(project.state, ProjectState::Unknown);
        assert_eq!(project.visibility, Some(ProjectVisibility::Unknown));

        let status: OperationStatus = serde_json::from_str("\"paused\"").unwrap();
        assert_eq!(status, OperationStatus::Unknown);
    }

    #[test]
    fn operation_status_classification() {
        for status in [
            OperationStatus::Succeeded,
            OperationStatus::Cancelled,
            OperationStatus::Failed,
        ] {
            assert!(status.is_terminal(), "{status} should be terminal");
        }
        for status in [
            OperationStatus::NotSet,
            OperationStatus::Queued,
            OperationStatus::InProgress,
            OperationStatus::Unknown,
        ] {
            assert!(!status.is_terminal(), "{status} should not be terminal");
        }
        assert!(!OperationStatus::Succeeded.is_failure());
        assert!(OperationStatus::Cancelled.is_failure());
    }

    #[test]
    fn operation_decodes_flattened_reference() {
        let json = r#"{
            "id": "109787e4-4c38-4d5e-9d5c-8b6e4a2c2b11",
            "status": "inProgress",
            "url": "https://dev.azure.com/fabrikam/_apis/operations/109787e4-4c38-4d5e-9d5c-8b6e4a2c2b11",
            "resultMessage": null
        }"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.status(), OperationStatus::InProgress);
        assert!(op.result_message.is_none());
    }

    #[test]
    fn git_repository_decodes_embedded_project() {
        let json = r#"{
            "id": "5febef5a-833d-4e14-b9c0-14cb638f91e6",
            "name": "AnotherRepository",
            "url": "https://dev.azure.com/fabrikam/_apis/git/repositories/5febef5a-833d-4e14-b9c0-14cb638f91e6",
            "project": {
                "id": "6ce954b1-ce1f-45d1-b94d-e6bf2464ba2c",
                "name": "Fabrikam-Fiber-Git",
                "state": "wellFormed",
                "lastUpdateTime": "0001-01-01T00:00:00"
            },
            "remoteUrl": "https://dev.azure.com/fabrikam/Fabrikam-Fiber-Git/_git/AnotherRepository"
        }"#;
        let repo: GitRepository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.name, "AnotherRepository");
        assert_eq!(repo.project.map(|p| p.name), Some("Fabrikam-Fiber-Git".to_string()));
        assert!(repo.default_branch.is_none());
    }
}
