use async_trait::async_trait;
use domain::{
    ApiError, ContinuationToken, CoreApi, CreateProjectRequest, CreateRepositoryRequest,
    GitApi, GitRepository, Operation, OperationId, OperationReference, OperationsApi, ProjectKey,
    ProjectPage, RepositoryId, TeamProject, TeamProjectReference,
};
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::wire::{self, ListResponse};
use crate::ConnectionConfig;

/// Errors raised while constructing an [`AzureDevOpsClient`].
///
/// Request-time failures are reported as [`ApiError`] through the port traits.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Personal access token is empty")]
    EmptyToken,

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// REST client for one Azure DevOps organization.
///
/// Implements [`CoreApi`], [`GitApi`] and [`OperationsApi`]; wrap it in an
/// `Arc` and hand it to the façade.
#[derive(Debug, Clone)]
pub struct AzureDevOpsClient {
    http: Client,
    config: ConnectionConfig,
    /// `{base_url}/{organization}`, validated at construction.
    org_url: Url,
}

impl AzureDevOpsClient {
    pub fn new(config: ConnectionConfig) -> Result<Self, ClientError> {
        if config.personal_access_token().trim().is_empty() {
            return Err(ClientError::EmptyToken);
        }

        let org_url = organization_url(config.base_url(), config.organization().as_str())?;
        let http = Client::builder()
            .user_agent(concat!("devops-helper/", env!("CARGO_PKG_VERSION")))
            .build()?;

        debug!(%org_url, api_version = %config.api_version(), "created Azure DevOps client");
        Ok(Self {
            http,
            config,
            org_url,
        })
    }

    /// Builds `{org_url}[/{project}]/{segments...}?api-version=..&{query}`.
    fn endpoint(
        &self,
        project: Option<&ProjectKey>,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, ApiError> {
        let mut url = self.org_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                ApiError::transport(format!("organization URL {} cannot carry a path", self.org_url))
            })?;
            path.pop_if_empty();
            if let Some(project) = project {
                path.push(&project.to_string());
            }
            path.extend(segments);
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api-version", &self.config.api_version().to_string());
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Sends one authenticated request and decodes a JSON response.
    ///
    /// Returns the response headers alongside the body for callers that need
    /// paging information.
    async fn send<B, T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(T, HeaderMap), ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%method, %url, "sending request");

        let mut request = self
            .http
            .request(method, url)
            .basic_auth("", Some(self.config.personal_access_token()))
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(format!("request failed: {e}")))?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(format!("failed to read response body: {e}")))?;

        if status == StatusCode::NON_AUTHORITATIVE_INFORMATION {
            return Err(wire::sign_in_page_error(status));
        }
        if !status.is_success() {
            return Err(wire::error_from_response(status, &bytes));
        }

        let value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::transport(format!("failed to decode response: {e}")))?;
        Ok((value, headers))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<(T, HeaderMap), ApiError> {
        self.send::<(), T>(Method::GET, url, None).await
    }
}

/// Joins the base URL and the organization into the root of every endpoint.
fn organization_url(base_url: &str, organization: &str) -> Result<Url, ClientError> {
    let invalid = |reason: &str| ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot carry a path"))?
        .pop_if_empty()
        .push(organization);
    Ok(url)
}

#[async_trait]
impl CoreApi for AzureDevOpsClient {
    #[instrument(skip(self))]
    async fn list_projects(
        &self,
        continuation: Option<ContinuationToken>,
    ) -> Result<ProjectPage, ApiError> {
        let query: Vec<(&str, &str)> = continuation
            .as_ref()
            .map(|token| ("continuationToken", token.as_str()))
            .into_iter()
            .collect();
        let url = self.endpoint(None, &["_apis", "projects"], &query)?;

        let (list, headers): (ListResponse<TeamProjectReference>, _) = self.get(url).await?;
        Ok(ProjectPage {
            projects: list.value,
            continuation_token: wire::continuation_token(&headers),
        })
    }

    #[instrument(skip_all, fields(project = %project))]
    async fn get_project(&self, project: &ProjectKey) -> Result<TeamProject, ApiError> {
        let key = project.to_string();
        let url = self.endpoint(
            None,
            &["_apis", "projects", &key],
            &[("includeCapabilities", "true")],
        )?;
        Ok(self.get::<TeamProject>(url).await?.0)
    }

    #[instrument(skip_all, fields(project = %request.name))]
    async fn queue_create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<OperationReference, ApiError> {
        let url = self.endpoint(None, &["_apis", "projects"], &[])?;
        let (operation, _) = self
            .send::<_, OperationReference>(Method::POST, url, Some(request))
            .await?;
        Ok(operation)
    }
}

#[async_trait]
impl GitApi for AzureDevOpsClient {
    #[instrument(skip(self))]
    async fn list_repositories(
        &self,
        project: Option<ProjectKey>,
    ) -> Result<Vec<GitRepository>, ApiError> {
        let url = self.endpoint(project.as_ref(), &["_apis", "git", "repositories"], &[])?;
        let (list, _): (ListResponse<GitRepository>, _) = self.get(url).await?;
        Ok(list.value)
    }

    #[instrument(skip(self))]
    async fn get_repository(
        &self,
        id: RepositoryId,
        project: Option<ProjectKey>,
    ) -> Result<GitRepository, ApiError> {
        let id = id.to_string();
        let url = self.endpoint(project.as_ref(), &["_apis", "git", "repositories", &id], &[])?;
        Ok(self.get::<GitRepository>(url).await?.0)
    }

    #[instrument(skip_all, fields(repository = %request.name))]
    async fn create_repository(
        &self,
        request: &CreateRepositoryRequest,
    ) -> Result<GitRepository, ApiError> {
        let project = request.project.key();
        let url = self.endpoint(Some(&project), &["_apis", "git", "repositories"], &[])?;
        let (repository, _) = self
            .send::<_, GitRepository>(Method::POST, url, Some(request))
            .await?;
        Ok(repository)
    }
}

#[async_trait]
impl OperationsApi for AzureDevOpsClient {
    #[instrument(skip(self))]
    async fn get_operation(&self, id: OperationId) -> Result<Operation, ApiError> {
        let id = id.to_string();
        let url = self.endpoint(None, &["_apis", "operations", &id], &[])?;
        Ok(self.get::<Operation>(url).await?.0)
    }
}
