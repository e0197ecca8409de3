//! Azure DevOps REST adapter.
//!
//! Implements the port traits defined in [`domain`] (`CoreApi`, `GitApi`,
//! `OperationsApi`) by calling the platform's REST endpoints directly with
//! [`reqwest`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! URL layout, authentication, `api-version` negotiation, continuation-token
//! headers and the platform's error body format are handled here; the façade
//! never sees them.
//!
//! ## Authentication
//!
//! Personal access tokens only, sent as HTTP basic auth with an empty user
//! name. The token is never logged and is redacted from `Debug` output.

mod client;
mod config;
mod wire;

pub use client::{AzureDevOpsClient, ClientError};
pub use config::{ConnectionConfig, DEFAULT_BASE_URL};
