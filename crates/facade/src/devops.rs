use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use domain::{
    CoreApi, DevOpsError, GitApi, GitRepository, OperationId, OperationStatus, OperationsApi,
    Project, ProjectDefaults, ProjectKey, Repository, RepositoryId, TeamProject,
    TeamProjectReference,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

use crate::{PollPolicy, ProjectOutcome, RepositoryOutcome};

/// Convenience layer over one organization's core, git and operations APIs.
///
/// Built once per session from an authenticated adapter and reused for every
/// call. Calls are sequential; nothing is cached between them.
pub struct DevOps {
    core: Arc<dyn CoreApi>,
    git: Arc<dyn GitApi>,
    operations: Arc<dyn OperationsApi>,
    defaults: ProjectDefaults,
    polling: PollPolicy,
    confirm: bool,
}

impl DevOps {
    /// Wraps a single adapter that serves all three client areas.
    pub fn new<C>(client: Arc<C>) -> Self
    where
        C: CoreApi + GitApi + OperationsApi + 'static,
    {
        Self::from_parts(client.clone(), client.clone(), client)
    }

    /// Wraps one handle per client area.
    pub fn from_parts(
        core: Arc<dyn CoreApi>,
        git: Arc<dyn GitApi>,
        operations: Arc<dyn OperationsApi>,
    ) -> Self {
        Self {
            core,
            git,
            operations,
            defaults: ProjectDefaults::default(),
            polling: PollPolicy::default(),
            confirm: true,
        }
    }

    /// Capabilities used for projects that do not specify their own.
    pub fn with_defaults(mut self, defaults: ProjectDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_polling(mut self, polling: PollPolicy) -> Self {
        self.polling = polling;
        self
    }

    /// Whether find-or-create waits for and re-reads newly created resources.
    /// On by default.
    pub fn with_confirmation(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn get_operation_status(&self, id: OperationId) -> Result<OperationStatus, DevOpsError> {
        Ok(self.operations.get_operation(id).await?.status())
    }

    /// Polls `id` until it reaches a terminal status or the polling window
    /// closes, and returns the last status seen. A non-terminal result means
    /// the window closed first.
    #[instrument(skip(self))]
    pub async fn wait_for_operation(&self, id: OperationId) -> Result<OperationStatus, DevOpsError> {
        Ok(self.poll_operation(id).await?.0)
    }

    /// Polling loop behind [`Self::wait_for_operation`]; also reports how
    /// long it ran.
    async fn poll_operation(
        &self,
        id: OperationId,
    ) -> Result<(OperationStatus, Duration), DevOpsError> {
        let started = Instant::now();
        let mut status = self.get_operation_status(id).await?;

        while !status.is_terminal() && started.elapsed() < self.polling.max_wait {
            debug!(%status, elapsed = ?started.elapsed(), "waiting for operation");
            sleep(self.polling.interval).await;
            status = self.get_operation_status(id).await?;
        }

        Ok((status, started.elapsed()))
    }

    /// Waits for a creation operation and turns failure or timeout into errors.
    async fn confirm_operation(&self, id: OperationId, resource: String) -> Result<(), DevOpsError> {
        let (status, waited) = self.poll_operation(id).await?;
        if status.is_failure() {
            return Err(DevOpsError::OperationFailed {
                resource,
                operation: id,
                status,
            });
        }
        if !status.is_terminal() {
            warn!(operation = %id, %status, "operation still running at end of polling window");
            return Err(DevOpsError::OperationTimedOut {
                resource,
                operation: id,
                status,
                waited,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Every project in the organization, keyed by name.
    ///
    /// Follows continuation tokens until the platform stops returning one.
    #[instrument(skip(self))]
    pub async fn get_existing_projects(
        &self,
    ) -> Result<BTreeMap<String, TeamProjectReference>, DevOpsError> {
        let mut projects = BTreeMap::new();
        let mut continuation = None;

        loop {
            let page = self.core.list_projects(continuation.take()).await?;
            debug!(count = page.projects.len(), "fetched project page");

            for project in page.projects {
                projects.insert(project.name.clone(), project);
            }

            match page.continuation_token {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        Ok(projects)
    }

    #[instrument(skip_all, fields(project = %project))]
    pub async fn get_project(&self, project: &ProjectKey) -> Result<TeamProject, DevOpsError> {
        Ok(self.core.get_project(project).await?)
    }

    /// Returns the project named `project.name()`, creating it if absent.
    ///
    /// Exactly one listing is made before deciding. When creation is needed
    /// exactly one create call is made; with confirmation on, the queued
    /// operation is then polled and the new project fetched by name.
    #[instrument(skip_all, fields(project = %project.name()))]
    pub async fn find_or_create_project(
        &self,
        project: &Project,
    ) -> Result<ProjectOutcome, DevOpsError> {
        let mut existing = self.get_existing_projects().await?;
        if let Some(found) = existing.remove(project.name().as_str()) {
            info!(id = %found.id, "project already exists");
            return Ok(ProjectOutcome::Existing(found));
        }

        let request = project.create_request(&self.defaults)?;
        let operation = self.core.queue_create_project(&request).await?;
        info!(operation = %operation.id, status = %operation.status, "project creation queued");

        if !self.confirm {
            return Ok(ProjectOutcome::Queued(operation));
        }

        self.confirm_operation(operation.id, format!("Project '{}'", project.name()))
            .await?;

        let created = self
            .get_project(&ProjectKey::Name(project.name().clone()))
            .await?;
        info!(id = %created.reference.id, "project created");
        Ok(ProjectOutcome::Created(created))
    }

    // -----------------------------------------------------------------------
    // Repositories
    // -----------------------------------------------------------------------

    /// Repositories in `project` (or the whole organization), keyed by name.
    #[instrument(skip(self))]
    pub async fn get_existing_repositories(
        &self,
        project: Option<&ProjectKey>,
    ) -> Result<BTreeMap<String, GitRepository>, DevOpsError> {
        let repositories = self.git.list_repositories(project.cloned()).await?;
        debug!(count = repositories.len(), "fetched repositories");

        Ok(repositories
            .into_iter()
            .map(|repo| (repo.name.clone(), repo))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_repository(
        &self,
        id: RepositoryId,
        project: Option<&ProjectKey>,
    ) -> Result<GitRepository, DevOpsError> {
        Ok(self.git.get_repository(id, project.cloned()).await?)
    }

    /// Returns the repository named `repository.name()` inside its project,
    /// creating it if absent.
    ///
    /// Lookups are scoped by the project id when known, otherwise by name.
    /// Repository creation is synchronous on the platform, so confirmation
    /// re-lists the project and re-reads the repository rather than polling.
    #[instrument(skip_all, fields(repository = %repository.name(), project = %repository.project().key()))]
    pub async fn find_or_create_repository(
        &self,
        repository: &Repository,
    ) -> Result<RepositoryOutcome, DevOpsError> {
        let project = repository.project().key();
        let name = repository.name().as_str();

        let mut existing = self.get_existing_repositories(Some(&project)).await?;
        if let Some(found) = existing.remove(name) {
            info!(id = %found.id, "repository already exists");
            return Ok(RepositoryOutcome::Existing(found));
        }

        let created = self
            .git
            .create_repository(&repository.create_request())
            .await?;
        info!(id = %created.id, "repository created");

        if !self.confirm {
            return Ok(RepositoryOutcome::Created(created));
        }

        let listed = self
            .get_existing_repositories(Some(&project))
            .await?
            .remove(name)
            .ok_or_else(|| DevOpsError::RepositoryNotFound {
                name: repository.name().clone(),
                project: project.clone(),
            })?;

        let confirmed = self.get_repository(listed.id, Some(&project)).await?;
        Ok(RepositoryOutcome::Created(confirmed))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use domain::{
        ApiError, ContinuationToken, MockCoreApi, MockGitApi, MockOperationsApi, Operation,
        OperationReference, ProcessTemplateId, ProjectId, ProjectName, ProjectPage, ProjectRef,
        ProjectState, RepositoryName, SourceControlType,
    };
    use mockall::Sequence;
    use uuid::Uuid;

    use super::*;

    const AGILE: &str = "adcc42ab-9882-485e-a3ed-7678f01f66bc";

    fn defaults() -> ProjectDefaults {
        ProjectDefaults {
            source_control: Some(SourceControlType::Git),
            process_template: Some(AGILE.parse::<ProcessTemplateId>().unwrap()),
        }
    }

    fn project_ref(name: &str) -> TeamProjectReference {
        TeamProjectReference {
            id: ProjectId::from_uuid(Uuid::new_v4()),
            name: name.to_string(),
            description: None,
            url: None,
            state: ProjectState::WellFormed,
            revision: None,
            visibility: None,
            last_update_time: None,
        }
    }

    fn team_project(name: &str) -> TeamProject {
        TeamProject {
            reference: project_ref(name),
            capabilities: BTreeMap::new(),
            default_team: None,
        }
    }

    fn git_repo(name: &str) -> GitRepository {
        GitRepository {
            id: RepositoryId::from_uuid(Uuid::new_v4()),
            name: name.to_string(),
            url: None,
            project: None,
            default_branch: None,
            size: None,
            remote_url: None,
            ssh_url: None,
            web_url: None,
            is_disabled: None,
        }
    }

    fn operation(id: OperationId, status: OperationStatus) -> Operation {
        Operation {
            reference: OperationReference {
                id,
                status,
                url: None,
                plugin_id: None,
            },
            result_message: None,
            detailed_message: None,
        }
    }

    fn single_page(projects: Vec<TeamProjectReference>) -> ProjectPage {
        ProjectPage {
            projects,
            continuation_token: None,
        }
    }

    fn some_project() -> Project {
        Project::new(ProjectName::new("Some Project").unwrap())
    }

    fn facade(core: MockCoreApi, git: MockGitApi, operations: MockOperationsApi) -> DevOps {
        DevOps::from_parts(Arc::new(core), Arc::new(git), Arc::new(operations))
            .with_defaults(defaults())
    }

    // -----------------------------------------------------------------------
    // find_or_create_project
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn existing_project_is_returned_without_create_call() {
        let mut core = MockCoreApi::new();
        core.expect_list_projects()
            .times(1)
            .returning(|_| Ok(single_page(vec![project_ref("Other"), project_ref("Some Project")])));
        core.expect_queue_create_project().never();

        let devops = facade(core, MockGitApi::new(), MockOperationsApi::new());
        let outcome = devops.find_or_create_project(&some_project()).await.unwrap();

        assert!(matches!(outcome, ProjectOutcome::Existing(_)));
        assert_eq!(outcome.name(), Some("Some Project"));
        assert!(!outcome.was_created());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_project_is_listed_then_created_once() {
        let op_id = OperationId::from_uuid(Uuid::new_v4());
        let mut seq = Sequence::new();

        let mut core = MockCoreApi::new();
        core.expect_list_projects()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(single_page(vec![project_ref("Other")])));
        core.expect_queue_create_project()
            .withf(|request| request.name == "Some Project")
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| {
                Ok(OperationReference {
                    id: op_id,
                    status: OperationStatus::Queued,
                    url: None,
                    plugin_id: None,
                })
            });
        core.expect_get_project()
            .withf(|key| *key == ProjectKey::Name(ProjectName::new("Some Project").unwrap()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(team_project("Some Project")));

        let mut operations = MockOperationsApi::new();
        operations
            .expect_get_operation()
            .withf(move |id| *id == op_id)
            .times(1)
            .returning(|id| Ok(operation(id, OperationStatus::Succeeded)));

        let devops = facade(core, MockGitApi::new(), operations);
        let outcome = devops.find_or_create_project(&some_project()).await.unwrap();

        assert!(matches!(outcome, ProjectOutcome::Created(_)));
        assert_eq!(outcome.name(), Some("Some Project"));
    }

    #[tokio::test]
    async fn unconfirmed_creation_returns_queued_operation() {
        let op_id = OperationId::from_uuid(Uuid::new_v4());

        let mut core = MockCoreApi::new();
        core.expect_list_projects()
            .times(1)
            .returning(|_| Ok(single_page(vec![])));
        core.expect_queue_create_project()
            .times(1)
            .returning(move |_| {
                Ok(OperationReference {
                    id: op_id,
                    status: OperationStatus::Queued,
                    url: None,
                    plugin_id: None,
                })
            });
        core.expect_get_project().never();

        let mut operations = MockOperationsApi::new();
        operations.expect_get_operation().never();

        let devops = facade(core, MockGitApi::new(), operations).with_confirmation(false);
        let outcome = devops.find_or_create_project(&some_project()).await.unwrap();

        match outcome {
            ProjectOutcome::Queued(reference) => assert_eq!(reference.id, op_id),
            other => panic!("expected queued outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn project_listing_follows_continuation_tokens() {
        let mut core = MockCoreApi::new();
        core.expect_list_projects()
            .withf(|token| token.is_none())
            .times(1)
            .returning(|_| {
                Ok(ProjectPage {
                    projects: vec![project_ref("Alpha"), project_ref("Beta")],
                    continuation_token: ContinuationToken::new("page-2"),
                })
            });
        core.expect_list_projects()
            .withf(|token| token.as_ref().map(|t| t.as_str()) == Some("page-2"))
            .times(1)
            .returning(|_| Ok(single_page(vec![project_ref("Some Project")])));
        core.expect_queue_create_project().never();

        let devops = facade(core, MockGitApi::new(), MockOperationsApi::new());

        let outcome = devops.find_or_create_project(&some_project()).await.unwrap();
        assert!(matches!(outcome, ProjectOutcome::Existing(_)));
    }

    #[tokio::test]
    async fn invalid_project_fails_before_create_call() {
        let mut core = MockCoreApi::new();
        core.expect_list_projects()
            .times(1)
            .returning(|_| Ok(single_page(vec![])));
        core.expect_queue_create_project().never();

        let devops = DevOps::from_parts(
            Arc::new(core),
            Arc::new(MockGitApi::new()),
            Arc::new(MockOperationsApi::new()),
        );

        let err = devops.find_or_create_project(&some_project()).await.unwrap_err();
        assert!(matches!(err, DevOpsError::InvalidProject { .. }));
    }

    #[tokio::test]
    async fn vendor_errors_propagate_unchanged() {
        let mut core = MockCoreApi::new();
        core.expect_list_projects().times(1).returning(|_| {
            Err(ApiError::http(401, "Access denied").with_type_key("UnauthorizedRequestException"))
        });
        core.expect_queue_create_project().never();

        let devops = facade(core, MockGitApi::new(), MockOperationsApi::new());
        let err = devops.find_or_create_project(&some_project()).await.unwrap_err();

        match err {
            DevOpsError::Api(api) => {
                assert_eq!(api.status, Some(401));
                assert_eq!(api.type_key.as_deref(), Some("UnauthorizedRequestException"));
            }
            other => panic!("expected vendor error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_creation_operation_is_reported() {
        let mut core = MockCoreApi::new();
        core.expect_list_projects()
            .returning(|_| Ok(single_page(vec![])));
        core.expect_queue_create_project().times(1).returning(|_| {
            Ok(OperationReference {
                id: OperationId::from_uuid(Uuid::new_v4()),
                status: OperationStatus::Queued,
                url: None,
                plugin_id: None,
            })
        });
        core.expect_get_project().never();

        let mut operations = MockOperationsApi::new();
        let mut seq = Sequence::new();
        operations
            .expect_get_operation()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(operation(id, OperationStatus::InProgress)));
        operations
            .expect_get_operation()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(operation(id, OperationStatus::Failed)));

        let devops = facade(core, MockGitApi::new(), operations);
        let err = devops.find_or_create_project(&some_project()).await.unwrap_err();

        assert!(matches!(
            err,
            DevOpsError::OperationFailed {
                status: OperationStatus::Failed,
                ..
            }
        ));
    }

    // -----------------------------------------------------------------------
    // wait_for_operation
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn polling_stops_when_window_closes() {
        let mut operations = MockOperationsApi::new();
        // Polls at 0s, 10s, 20s and 30s; the window (30s) is then closed.
        operations
            .expect_get_operation()
            .times(4)
            .returning(|id| Ok(operation(id, OperationStatus::InProgress)));

        let devops = facade(MockCoreApi::new(), MockGitApi::new(), operations);
        let status = devops
            .wait_for_operation(OperationId::from_uuid(Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(status, OperationStatus::InProgress);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_creation_times_out() {
        let mut core = MockCoreApi::new();
        core.expect_list_projects()
            .returning(|_| Ok(single_page(vec![])));
        core.expect_queue_create_project().times(1).returning(|_| {
            Ok(OperationReference {
                id: OperationId::from_uuid(Uuid::new_v4()),
                status: OperationStatus::Queued,
                url: None,
                plugin_id: None,
            })
        });
        core.expect_get_project().never();

        let mut operations = MockOperationsApi::new();
        operations
            .expect_get_operation()
            .returning(|id| Ok(operation(id, OperationStatus::Queued)));

        let devops = facade(core, MockGitApi::new(), operations).with_polling(PollPolicy::new(
            Duration::from_secs(5),
            Duration::from_secs(2),
        ));
        let err = devops.find_or_create_project(&some_project()).await.unwrap_err();

        match err {
            DevOpsError::OperationTimedOut { status, waited, .. } => {
                assert_eq!(status, OperationStatus::Queued);
                // Polls at 0s, 2s, 4s and 6s: the last one lands past the 5s window.
                assert!(waited >= Duration::from_secs(6), "waited {waited:?}");
                assert!(waited < Duration::from_secs(7), "waited {waited:?}");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // find_or_create_repository
    // -----------------------------------------------------------------------

    fn api_repository(project: ProjectRef) -> Repository {
        Repository::new(RepositoryName::new("api").unwrap(), project)
    }

    #[tokio::test]
    async fn existing_repository_is_returned_without_create_call() {
        let project_id = ProjectId::from_uuid(Uuid::new_v4());

        let mut git = MockGitApi::new();
        git.expect_list_repositories()
            .withf(move |project| *project == Some(ProjectKey::Id(project_id)))
            .times(1)
            .returning(|_| Ok(vec![git_repo("web"), git_repo("api")]));
        git.expect_create_repository().never();

        let devops = facade(MockCoreApi::new(), git, MockOperationsApi::new());
        let outcome = devops
            .find_or_create_repository(&api_repository(ProjectRef::both(
                project_id,
                ProjectName::new("Some Project").unwrap(),
            )))
            .await
            .unwrap();

        assert!(!outcome.was_created());
        assert_eq!(outcome.repository().name, "api");
    }

    #[tokio::test]
    async fn missing_repository_is_created_and_confirmed() {
        let created = git_repo("api");
        let created_id = created.id;
        let project_name = ProjectName::new("Some Project").unwrap();
        let scope = ProjectKey::Name(project_name.clone());

        let mut git = MockGitApi::new();
        let mut seq = Sequence::new();
        git.expect_list_repositories()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![]));
        let body_created = created.clone();
        git.expect_create_repository()
            .withf(|request| {
                request.name == "api"
                    && request.project.name().map(|n| n.as_str()) == Some("Some Project")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(body_created.clone()));
        let listed = created.clone();
        git.expect_list_repositories()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(vec![listed.clone()]));
        let fetched = created.clone();
        git.expect_get_repository()
            .withf(move |id, project| *id == created_id && *project == Some(scope.clone()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(fetched.clone()));

        let devops = facade(MockCoreApi::new(), git, MockOperationsApi::new());
        let outcome = devops
            .find_or_create_repository(&api_repository(ProjectRef::by_name(project_name)))
            .await
            .unwrap();

        assert!(outcome.was_created());
        assert_eq!(outcome.into_repository().id, created_id);
    }

    #[tokio::test]
    async fn unconfirmed_repository_creation_returns_create_response() {
        let mut git = MockGitApi::new();
        git.expect_list_repositories()
            .times(1)
            .returning(|_| Ok(vec![]));
        git.expect_create_repository()
            .times(1)
            .returning(|_| Ok(git_repo("api")));
        git.expect_get_repository().never();

        let devops =
            facade(MockCoreApi::new(), git, MockOperationsApi::new()).with_confirmation(false);
        let outcome = devops
            .find_or_create_repository(&api_repository(ProjectRef::by_id(ProjectId::from_uuid(
                Uuid::new_v4(),
            ))))
            .await
            .unwrap();

        assert!(outcome.was_created());
        assert_eq!(outcome.repository().name, "api");
    }

    #[tokio::test]
    async fn repository_missing_after_creation_is_an_error() {
        let mut git = MockGitApi::new();
        git.expect_list_repositories()
            .times(2)
            .returning(|_| Ok(vec![git_repo("web")]));
        git.expect_create_repository()
            .times(1)
            .returning(|_| Ok(git_repo("api")));
        git.expect_get_repository().never();

        let devops = facade(MockCoreApi::new(), git, MockOperationsApi::new());
        let err = devops
            .find_or_create_repository(&api_repository(ProjectRef::by_name(
                ProjectName::new("Some Project").unwrap(),
            )))
            .await
            .unwrap_err();

        assert!(matches!(err, DevOpsError::RepositoryNotFound { .. }));
    }

    #[tokio::test]
    async fn outcomes_serialise_with_outcome_tag() {
        let outcome = RepositoryOutcome::Existing(git_repo("api"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "existing");
        assert_eq!(json["resource"]["name"], "api");
    }
}
