//! Domain types and port definitions for the Azure DevOps helper.
//!
//! This crate contains the value objects callers hand to the façade, the
//! vendor-native resource types the façade hands back, newtype identifiers,
//! and the error types shared by every layer. Infrastructure crates implement
//! the traits in [`ports`]; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies.
//! It defines *what* the façade needs from the platform; the `azure` crate
//! defines *how* to talk to it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ProjectId`, `RepositoryName`, etc.) |
//! | [`values`] | Caller-side value objects (`Project`, `Repository`) and create requests |
//! | [`resources`] | Platform resources (`TeamProject`, `GitRepository`, `Operation`) |
//! | [`types`] | Shared primitives (`Timestamp`, `ApiVersion`) |
//! | [`errors`] | `ApiError` (vendor pass-through) and `DevOpsError` |
//! | [`ports`] | `CoreApi`, `GitApi`, `OperationsApi` traits |

pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod resources;
pub mod types;
pub mod values;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{ApiError, DevOpsError};
pub use identifiers::{
    ContinuationToken, OperationId, OrganizationName, ProcessTemplateId, ProjectId, ProjectKey,
    ProjectName, RepositoryId, RepositoryName,
};
pub use ports::{CoreApi, GitApi, OperationsApi};
#[cfg(any(test, feature = "mocks"))]
pub use ports::{MockCoreApi, MockGitApi, MockOperationsApi};
pub use resources::{
    GitRepository, Operation, OperationReference, OperationStatus, ProjectPage, ProjectState,
    ProjectVisibility, TeamProject, TeamProjectReference, WebApiTeamRef,
};
pub use types::{ApiVersion, ParseApiVersionError, Timestamp};
pub use values::{
    CreateProjectRequest, CreateRepositoryRequest, ParseSourceControlError, Project,
    ProjectDefaults, ProjectRef, Repository, SourceControlType,
};
