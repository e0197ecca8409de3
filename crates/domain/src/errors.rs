//! Error types shared by every layer.
//!
//! [`ApiError`] is the platform's own failure, carried verbatim: the HTTP
//! status, the service's `typeKey` and its message. Nothing in the façade
//! rewrites or retries it.
//!
//! [`DevOpsError`] adds the handful of conditions the façade itself detects
//! (invalid value objects, failed or stalled creation operations).

use std::time::Duration;

use thiserror::Error;

use crate::{OperationId, OperationStatus, ProjectKey, RepositoryName};

// ---------------------------------------------------------------------------
// Vendor errors
// ---------------------------------------------------------------------------

/// A failure reported by, or while talking to, the Azure DevOps REST API.
///
/// `status` is `None` when no HTTP response was received (connection failure,
/// TLS error, timeout) or when the response body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the failed response, if one was received.
    pub status: Option<u16>,
    /// The service's exception type key (e.g. `"ProjectAlreadyExistsException"`).
    pub type_key: Option<String>,
    /// Human-readable description, taken from the response body when present.
    pub message: String,
}

impl ApiError {
    /// An error for a response with the given status and message.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            type_key: None,
            message: message.into(),
        }
    }

    /// An error raised before or after the HTTP exchange (transport, decoding).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            type_key: None,
            message: message.into(),
        }
    }

    /// Attaches the service's exception type key.
    pub fn with_type_key(mut self, type_key: impl Into<String>) -> Self {
        self.type_key = Some(type_key.into());
        self
    }

    /// Returns `true` for `404 Not Found` responses.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// Returns `true` for `401`/`403` responses, which on this platform almost
    /// always mean a missing, expired or under-scoped personal access token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, &self.type_key) {
            (Some(status), Some(key)) => write!(f, "HTTP {status} ({key}): {}", self.message),
            (Some(status), None) => write!(f, "HTTP {status}: {}", self.message),
            (None, _) => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

// ---------------------------------------------------------------------------
// Façade errors
// ---------------------------------------------------------------------------

/// Errors returned by the façade's find-or-create operations.
#[derive(Debug, Error)]
pub enum DevOpsError {
    /// The platform rejected or failed a request. Passed through unchanged.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The `Project` value object cannot be turned into a create request.
    ///
    /// Produced before any create call is made.
    #[error("Invalid project '{name}': {reason}")]
    InvalidProject {
        /// Name of the project being created.
        name: String,
        /// What is missing or malformed.
        reason: String,
    },

    /// A queued creation operation finished as `cancelled` or `failed`.
    #[error("{resource} creation failed: operation {operation} finished as {status}")]
    OperationFailed {
        /// Human-readable label of what was being created.
        resource: String,
        /// The operation that was polled.
        operation: OperationId,
        /// The terminal status observed.
        status: OperationStatus,
    },

    /// A queued creation operation did not reach a terminal status within
    /// the configured polling window.
    #[error("{resource} creation not confirmed: operation {operation} still {status} after {waited:?}")]
    OperationTimedOut {
        /// Human-readable label of what was being created.
        resource: String,
        /// The operation that was polled.
        operation: OperationId,
        /// The last (non-terminal) status observed.
        status: OperationStatus,
        /// How long the façade waited.
        waited: Duration,
    },

    /// A repository was created but does not appear in its project's listing.
    ///
    /// The creation may still be in flight or may have silently failed.
    #[error("Repository '{name}' not found in project {project} after creation")]
    RepositoryNotFound {
        /// Name of the repository that was created.
        name: RepositoryName,
        /// The project that was listed.
        project: ProjectKey,
    },
}
