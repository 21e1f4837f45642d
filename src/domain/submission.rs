//! Submission orchestration for registration and profile editing.
//!
//! Each submit action owns one flow value end-to-end: the flow drives the
//! two-step commit against the identity provider and document store and
//! records every state transition for the interface layer. A flow suspends
//! only at the collaborator calls, retries nothing, and imposes no timeout
//! of its own. There is no cancellation: a flow dropped mid-flight simply
//! never observes its late result, which is the documented policy for
//! navigating away during a submission.

use std::fmt;
use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::auth::{AuthSession, IdentityId, SignupCredentials};
use crate::domain::error;
use crate::domain::form::FormState;
use crate::domain::ports::{IdentityError, IdentityProvider, StoreError, UserStore};
use crate::domain::record::{ProfileUpdate, Role, UserRecord};
use crate::domain::validation::Field;

/// States of the submission state machine, exposed to the interface layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// No submission in progress.
    Idle,
    /// Running the field validators over the form.
    Validating,
    /// Waiting on the identity provider.
    CreatingIdentity,
    /// Waiting on the document store.
    PersistingRecord,
    /// The commit completed; navigation fires.
    Succeeded,
    /// Terminal failure; the user must resubmit to start over.
    Failed,
}

impl SubmissionState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::CreatingIdentity => "creating-identity",
            Self::PersistingRecord => "persisting-record",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the interface layer should send the user next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// The login screen; follows a successful registration.
    Login,
    /// The role-selection screen; follows cancel/back.
    RoleSelection,
}

/// Failures surfaced by the submission flows.
///
/// Validation failures stay inline on the form; every other variant is shown
/// as a single top-level message, with collaborator reasons passed through
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// One or more field validators failed; details are on the form.
    #[error("one or more fields are invalid")]
    Validation,
    /// The identity provider rejected the credentials.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// The store failed while reading or updating an existing record.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The store rejected the record create after the identity was already
    /// issued. The identity is not rolled back; it survives as an orphan
    /// until [`RegistrationFlow::persist_record_for`] retries the write.
    #[error("profile could not be saved: {source}")]
    Persistence {
        /// The orphaned identity, reusable for a persistence retry.
        identity_id: IdentityId,
        source: StoreError,
    },
    /// No authenticated identity; resolved by redirecting to login.
    #[error("not signed in")]
    NotAuthenticated,
    /// The stored record belongs to the other role.
    #[error("this account is registered as a {found}, not a {expected}")]
    RoleMismatch { expected: Role, found: Role },
    /// No record exists for the authenticated identity.
    #[error("no profile record exists for this account")]
    RecordMissing,
}

impl SubmissionError {
    /// Map the failure into the transport-agnostic payload shown by the
    /// interface layer.
    ///
    /// The message is this error's `Display` output, so collaborator
    /// reasons pass through verbatim. The orphaned identity id and the
    /// mismatched roles travel as structured details.
    pub fn to_error(&self) -> error::Error {
        match self {
            Self::Validation => error::Error::invalid_request(self.to_string()),
            Self::Identity(IdentityError::Transport { .. })
            | Self::Store(StoreError::Connection { .. }) => {
                error::Error::service_unavailable(self.to_string())
            }
            Self::Identity(_) => error::Error::invalid_request(self.to_string()),
            Self::Store(StoreError::NotFound { .. }) | Self::RecordMissing => {
                error::Error::not_found(self.to_string())
            }
            Self::Store(StoreError::Write { .. }) => error::Error::internal(self.to_string()),
            Self::Persistence {
                identity_id,
                source,
            } => {
                let payload = match source {
                    StoreError::Connection { .. } => {
                        error::Error::service_unavailable(self.to_string())
                    }
                    _ => error::Error::internal(self.to_string()),
                };
                payload.with_details(json!({ "identityId": identity_id }))
            }
            Self::NotAuthenticated => error::Error::unauthorized(self.to_string()),
            Self::RoleMismatch { expected, found } => {
                error::Error::forbidden(self.to_string()).with_details(json!({
                    "expected": expected,
                    "found": found,
                }))
            }
        }
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSuccess {
    /// Identity issued by the provider; the record key in the store.
    pub identity_id: IdentityId,
    /// Navigation target, always the login screen.
    pub redirect: Redirect,
}

/// Orchestrates one registration submission.
///
/// Transitions `Idle → Validating → CreatingIdentity → PersistingRecord →
/// Succeeded`, with `Failed` reachable from every non-terminal state.
pub struct RegistrationFlow<I, S> {
    identity_provider: Arc<I>,
    users: Arc<S>,
    state: SubmissionState,
}

impl<I, S> RegistrationFlow<I, S>
where
    I: IdentityProvider,
    S: UserStore,
{
    /// Create an idle flow over the given collaborators.
    pub fn new(identity_provider: Arc<I>, users: Arc<S>) -> Self {
        Self {
            identity_provider,
            users,
            state: SubmissionState::Idle,
        }
    }

    /// Current machine state.
    pub const fn state(&self) -> SubmissionState {
        self.state
    }

    /// Run the full two-step commit for a registration form.
    ///
    /// On a validation failure the per-field errors stay inline on the form
    /// and no collaborator is called. An identity failure commits nothing.
    /// A persistence failure leaves the created identity in place and
    /// reports it through [`SubmissionError::Persistence`].
    ///
    /// Calling submit again restarts the machine from the top; a failed
    /// attempt holds no partial state in the flow itself.
    pub async fn submit(
        &mut self,
        form: &mut FormState,
    ) -> Result<RegistrationSuccess, SubmissionError> {
        let credentials = self.validate(form)?;

        self.transition(SubmissionState::CreatingIdentity);
        let identity_id = match self.identity_provider.create_identity(&credentials).await {
            Ok(id) => id,
            Err(error) => {
                warn!(role = %form.kind().role(), %error, "identity creation rejected");
                self.transition(SubmissionState::Failed);
                return Err(error.into());
            }
        };

        self.persist(identity_id, form).await
    }

    /// Retry the record write for an identity whose first persistence
    /// attempt failed.
    ///
    /// The identity already exists, so this skips `CreatingIdentity`
    /// entirely; a success here resolves the orphan without a second call to
    /// the provider.
    pub async fn persist_record_for(
        &mut self,
        identity_id: IdentityId,
        form: &mut FormState,
    ) -> Result<RegistrationSuccess, SubmissionError> {
        self.validate(form)?;
        self.persist(identity_id, form).await
    }

    /// Validation gate shared by first submission and persistence retry.
    ///
    /// Builds the credentials here so a form that somehow lacks an email or
    /// password fails locally instead of reaching the provider.
    fn validate(&mut self, form: &mut FormState) -> Result<SignupCredentials, SubmissionError> {
        self.transition(SubmissionState::Validating);
        if !form.validate_all() {
            self.transition(SubmissionState::Failed);
            return Err(SubmissionError::Validation);
        }
        match SignupCredentials::try_from_parts(
            form.value(Field::Email),
            form.value(Field::Password),
        ) {
            Ok(credentials) => Ok(credentials),
            Err(error) => {
                warn!(%error, "credential shape rejected after validation");
                self.transition(SubmissionState::Failed);
                Err(SubmissionError::Validation)
            }
        }
    }

    async fn persist(
        &mut self,
        identity_id: IdentityId,
        form: &FormState,
    ) -> Result<RegistrationSuccess, SubmissionError> {
        self.transition(SubmissionState::PersistingRecord);
        let record = UserRecord::from_validated_form(form);
        match self.users.create(&identity_id, &record).await {
            Ok(()) => {
                info!(role = %record.role(), %identity_id, "registration committed");
                self.transition(SubmissionState::Succeeded);
                Ok(RegistrationSuccess {
                    identity_id,
                    redirect: Redirect::Login,
                })
            }
            Err(source) => {
                warn!(
                    %identity_id,
                    error = %source,
                    "record write failed; identity left orphaned pending retry"
                );
                self.transition(SubmissionState::Failed);
                Err(SubmissionError::Persistence {
                    identity_id,
                    source,
                })
            }
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        debug!(from = %self.state, to = %next, "submission state change");
        self.state = next;
    }
}

/// Orchestrates one profile-edit submission.
///
/// Skips identity creation entirely: `Validating → PersistingRecord →
/// Succeeded/Failed`. The persisting step re-reads the record, confirms the
/// stored role matches the screen, then issues a single targeted update
/// restricted to the role's owned fields.
pub struct ProfileEditFlow<S> {
    users: Arc<S>,
    state: SubmissionState,
}

impl<S> ProfileEditFlow<S>
where
    S: UserStore,
{
    /// Create an idle flow over the given store.
    pub fn new(users: Arc<S>) -> Self {
        Self {
            users,
            state: SubmissionState::Idle,
        }
    }

    /// Current machine state.
    pub const fn state(&self) -> SubmissionState {
        self.state
    }

    /// Validate and persist an edit form for the authenticated identity.
    ///
    /// Resubmitting unchanged valid values issues an identical update and
    /// succeeds again; updates are last-write-wins.
    pub async fn submit(
        &mut self,
        session: &AuthSession,
        form: &mut FormState,
    ) -> Result<(), SubmissionError> {
        self.transition(SubmissionState::Validating);
        let Some(identity_id) = session.identity() else {
            self.transition(SubmissionState::Failed);
            return Err(SubmissionError::NotAuthenticated);
        };
        if !form.validate_all() {
            self.transition(SubmissionState::Failed);
            return Err(SubmissionError::Validation);
        }

        self.transition(SubmissionState::PersistingRecord);
        let expected = form.kind().role();
        let record = match self.users.find(identity_id).await {
            Ok(record) => record,
            Err(error) => {
                warn!(%identity_id, %error, "record read failed during edit");
                self.transition(SubmissionState::Failed);
                return Err(error.into());
            }
        };
        let Some(record) = record else {
            self.transition(SubmissionState::Failed);
            return Err(SubmissionError::RecordMissing);
        };
        if record.role() != expected {
            warn!(%identity_id, found = %record.role(), %expected, "role mismatch on edit");
            self.transition(SubmissionState::Failed);
            return Err(SubmissionError::RoleMismatch {
                expected,
                found: record.role(),
            });
        }

        let update = ProfileUpdate::from_validated_form(form);
        match self.users.update(identity_id, &update).await {
            Ok(()) => {
                info!(%identity_id, role = %expected, "profile update committed");
                self.transition(SubmissionState::Succeeded);
                Ok(())
            }
            Err(error) => {
                warn!(%identity_id, %error, "profile update failed");
                self.transition(SubmissionState::Failed);
                Err(error.into())
            }
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        debug!(from = %self.state, to = %next, "submission state change");
        self.state = next;
    }
}
