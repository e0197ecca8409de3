//! Runtime configuration.
//!
//! Values come from, in order of precedence: command-line flags, process
//! environment, and a `.env` file in the working directory (loaded into the
//! environment by `main` before anything else runs).
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `org_name` / `ORG_NAME` | Organization segment of the service URL |
//! | `personal_access_token` / `PERSONAL_ACCESS_TOKEN` | PAT used for basic auth |
//! | `SOURCE_CONTROL_TYPE` | Default for new projects (`Git` or `Tfvc`) |
//! | `TEMPLATE_TYPE_ID` | Default process template GUID for new projects |
//! | `AZURE_DEVOPS_URL` | Base URL override (on-premises servers) |
//! | `AZURE_DEVOPS_API_VERSION` | `api-version` override, e.g. `7.0` |

use azure::ConnectionConfig;
use domain::{ApiVersion, OrganizationName, ProcessTemplateId, ProjectDefaults, SourceControlType};
use thiserror::Error;

use crate::ConnectionArgs;

const ORG_VARS: &[&str] = &["org_name", "ORG_NAME"];
const TOKEN_VARS: &[&str] = &["personal_access_token", "PERSONAL_ACCESS_TOKEN"];
const SOURCE_CONTROL_VAR: &str = "SOURCE_CONTROL_TYPE";
const TEMPLATE_VAR: &str = "TEMPLATE_TYPE_ID";
const BASE_URL_VAR: &str = "AZURE_DEVOPS_URL";
const API_VERSION_VAR: &str = "AZURE_DEVOPS_API_VERSION";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing {what}: pass {flag} or set {var}")]
    Missing {
        what: &'static str,
        flag: &'static str,
        var: &'static str,
    },

    #[error("Invalid {name} '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionConfig,
    pub defaults: ProjectDefaults,
}

impl Settings {
    /// Resolves settings from flags and the process environment.
    pub fn from_env(args: &ConnectionArgs) -> Result<Self, ConfigError> {
        Self::resolve(args, |name| std::env::var(name).ok())
    }

    /// Resolves settings from flags and an arbitrary variable lookup.
    pub fn resolve(
        args: &ConnectionArgs,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let organization = args
            .org
            .clone()
            .or_else(|| first(ORG_VARS))
            .and_then(OrganizationName::new)
            .ok_or(ConfigError::Missing {
                what: "organization name",
                flag: "--org",
                var: "org_name",
            })?;

        let token = args
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .or_else(|| first(TOKEN_VARS))
            .ok_or(ConfigError::Missing {
                what: "personal access token",
                flag: "--token",
                var: "personal_access_token",
            })?;

        let mut connection = ConnectionConfig::new(organization, token);
        if let Some(base_url) = args.base_url.clone().or_else(|| first(&[BASE_URL_VAR])) {
            connection = connection.with_base_url(base_url);
        }
        if let Some(value) = first(&[API_VERSION_VAR]) {
            let version = value
                .parse::<ApiVersion>()
                .map_err(|e| ConfigError::Invalid {
                    name: API_VERSION_VAR,
                    value,
                    reason: e.to_string(),
                })?;
            connection = connection.with_api_version(version);
        }

        let source_control = match first(&[SOURCE_CONTROL_VAR]) {
            Some(value) => Some(value.parse::<SourceControlType>().map_err(|e| {
                ConfigError::Invalid {
                    name: SOURCE_CONTROL_VAR,
                    value,
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        let process_template = match first(&[TEMPLATE_VAR]) {
            Some(value) => Some(value.parse::<ProcessTemplateId>().map_err(|e| {
                ConfigError::Invalid {
                    name: TEMPLATE_VAR,
                    value,
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            connection,
            defaults: ProjectDefaults {
                source_control,
                process_template,
            },
        })
    }
}
