//! Domain primitives and services.
//!
//! Purpose: hold the validation rules, form state, record shapes, and
//! submission orchestration shared by the registration and profile-editing
//! screens. Keep types strongly typed and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - `Error`, `ErrorCode` — transport-agnostic error payload.
//! - `Field`, `FieldError`, `validate` — per-field validation rules.
//! - `FormKind`, `FormState` — per-screen field sets and live error state.
//! - `Role`, `UserRecord`, `ProfileUpdate` — persisted record shapes.
//! - `RegistrationFlow`, `ProfileEditFlow`, `SubmissionState` — the
//!   two-step commit state machine.
//! - `ProfileLoader`, `ProfileLoadOutcome` — edit-screen seeding.
//! - `ports` — collaborator contracts (identity provider, document store).

pub mod auth;
pub mod error;
pub mod form;
pub mod ports;
pub mod profile;
pub mod record;
pub mod submission;
pub mod validation;

pub use self::auth::{AuthSession, AuthValidationError, IdentityId, SignupCredentials};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::form::{FormKind, FormState};
pub use self::profile::{ProfileLoadOutcome, ProfileLoader};
pub use self::record::{ProfileUpdate, Role, RoleProfile, UserRecord};
pub use self::submission::{
    ProfileEditFlow, Redirect, RegistrationFlow, RegistrationSuccess, SubmissionError,
    SubmissionState,
};
pub use self::validation::{Field, FieldError, validate};
