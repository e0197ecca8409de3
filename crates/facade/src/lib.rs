//! Find-or-create façade over the Azure DevOps API.
//!
//! [`DevOps`] hides which client area serves which call and offers the two
//! convenience operations the helper exists for:
//!
//! - [`DevOps::find_or_create_project`]
//! - [`DevOps::find_or_create_repository`]
//!
//! plus the lookups they are built from. Both operations look before they
//! create: an existing resource with the same name is returned untouched and
//! no create call is made.
//!
//! ## Architectural Layer
//!
//! **Orchestration.** The façade sequences calls on the port traits defined in
//! [`domain`]; it never sees HTTP. Vendor failures surface unchanged as
//! [`domain::DevOpsError::Api`]. There is no retry and no locking: two callers
//! racing on the same name can both decide to create.

mod devops;
mod outcome;
mod polling;

pub use devops::DevOps;
pub use outcome::{ProjectOutcome, RepositoryOutcome};
pub use polling::PollPolicy;
