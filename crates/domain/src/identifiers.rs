//! Newtype identifiers.
//!
//! Every concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`ProjectId`] with a [`RepositoryId`] even though both are GUIDs under the
//! hood, or a [`ProjectName`] with a [`RepositoryName`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for GUID-wrapped newtypes (platform-assigned identifiers).
// Generates: struct (Copy), from_uuid(), as_uuid(), Display, FromStr.
// ---------------------------------------------------------------------------
macro_rules! uuid_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the underlying [`Uuid`].
            pub fn as_uuid(self) -> Uuid {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// GUID-backed identifiers
// ---------------------------------------------------------------------------

uuid_id! {
    /// Identifies a team project within an organization.
    ProjectId
}

uuid_id! {
    /// Identifies a Git repository within a project.
    RepositoryId
}

uuid_id! {
    /// Identifies a long-running platform operation (e.g. project creation).
    ///
    /// Project creation is queued; the returned operation is polled until it
    /// reaches a terminal status.
    OperationId
}

uuid_id! {
    /// Identifies a process template (Agile, Scrum, Basic, CMMI or a custom one).
    ///
    /// Sent as `capabilities.processTemplate.templateTypeId` when creating a project.
    ProcessTemplateId
}

// ---------------------------------------------------------------------------
// String-backed identifiers
// ---------------------------------------------------------------------------

string_id! {
    /// The organization segment of `https://dev.azure.com/{organization}`.
    OrganizationName
}

string_id! {
    /// The display name of a team project (e.g. `"Some Project"`).
    ProjectName
}

string_id! {
    /// The name of a Git repository within a project.
    RepositoryName
}

string_id! {
    /// Opaque paging cursor returned by the platform in the
    /// `x-ms-continuationtoken` header.
    ContinuationToken
}

// ---------------------------------------------------------------------------
// Project lookup key
// ---------------------------------------------------------------------------

/// A project addressed either by id or by name.
///
/// The platform accepts both forms wherever a `{project}` path segment is
/// expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectKey {
    Id(ProjectId),
    Name(ProjectName),
}

impl ProjectKey {
    /// Parses a command-line style reference: a GUID becomes an id, anything
    /// else non-empty becomes a name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.parse::<ProjectId>() {
            Ok(id) => Some(Self::Id(id)),
            Err(_) => ProjectName::new(value).map(Self::Name),
        }
    }
}

impl From<ProjectId> for ProjectKey {
    fn from(id: ProjectId) -> Self {
        Self::Id(id)
    }
}

impl From<ProjectName> for ProjectKey {
    fn from(name: ProjectName) -> Self {
        Self::Name(name)
    }
}

impl std::fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}
