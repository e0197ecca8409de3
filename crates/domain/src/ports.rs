//! Port traits: the slice of the Azure DevOps API the façade depends on.
//!
//! Split along the platform's own client areas (core, git, operations) so an
//! adapter can be swapped or faked one area at a time. Every method returns
//! the vendor's error unchanged as [`ApiError`].
//!
//! With the `mocks` feature enabled, `mockall` generates [`MockCoreApi`],
//! [`MockGitApi`] and [`MockOperationsApi`] for downstream test suites.

use async_trait::async_trait;

use crate::{
    ApiError, ContinuationToken, CreateProjectRequest, CreateRepositoryRequest, GitRepository,
    Operation, OperationId, OperationReference, ProjectKey, ProjectPage, RepositoryId, TeamProject,
};

/// Project endpoints (`_apis/projects`).
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait CoreApi: Send + Sync {
    /// Returns one page of the organization's projects.
    ///
    /// Pass the previous page's continuation token to fetch the next page.
    async fn list_projects(
        &self,
        continuation: Option<ContinuationToken>,
    ) -> Result<ProjectPage, ApiError>;

    /// Fetches a single project by id or name.
    async fn get_project(&self, project: &ProjectKey) -> Result<TeamProject, ApiError>;

    /// Queues creation of a project. Creation completes asynchronously; poll
    /// the returned operation via [`OperationsApi::get_operation`].
    async fn queue_create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<OperationReference, ApiError>;
}

/// Git repository endpoints (`_apis/git/repositories`).
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait GitApi: Send + Sync {
    /// Lists repositories in `project`, or across the organization when `None`.
    async fn list_repositories(
        &self,
        project: Option<ProjectKey>,
    ) -> Result<Vec<GitRepository>, ApiError>;

    async fn get_repository(
        &self,
        id: RepositoryId,
        project: Option<ProjectKey>,
    ) -> Result<GitRepository, ApiError>;

    /// Creates a repository. Unlike projects this completes synchronously.
    async fn create_repository(
        &self,
        request: &CreateRepositoryRequest,
    ) -> Result<GitRepository, ApiError>;
}

/// Long-running operation endpoints (`_apis/operations`).
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait OperationsApi: Send + Sync {
    async fn get_operation(&self, id: OperationId) -> Result<Operation, ApiError>;
}
