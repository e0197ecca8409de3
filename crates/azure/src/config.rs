use domain::{ApiVersion, OrganizationName};

/// Base URL of the hosted service. On-premises servers use their own
/// collection URL instead (e.g. `https://tfs.example.com/tfs/`).
pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com/";

/// Everything needed to reach and authenticate against one organization.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    organization: OrganizationName,
    personal_access_token: String,
    base_url: String,
    api_version: ApiVersion,
}

impl ConnectionConfig {
    pub fn new(organization: OrganizationName, personal_access_token: impl Into<String>) -> Self {
        Self {
            organization,
            personal_access_token: personal_access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: ApiVersion::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    pub fn organization(&self) -> &OrganizationName {
        &self.organization
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    pub(crate) fn personal_access_token(&self) -> &str {
        &self.personal_access_token
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("organization", &self.organization)
            .field("personal_access_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}
