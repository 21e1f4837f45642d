//! Account registration and profile editing engine for a two-role clinic
//! portal.
//!
//! The crate owns field validation, form state, role-tagged record shaping,
//! and the orchestration of the two-step commit against an external identity
//! provider and document store. Presentation concerns (layout, routing,
//! styling) live outside the crate and consume the outcome values exposed
//! here.

pub mod domain;

pub use domain::{FormKind, FormState, Role, SubmissionState, UserRecord};
