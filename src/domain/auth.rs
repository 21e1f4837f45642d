//! Authentication primitives: identity ids, signup credentials, sessions.
//!
//! The identity provider issues opaque identifiers; the crate only requires
//! them to be non-empty and trimmed. Credentials keep the password in
//! zeroizing storage so it is wiped once the submission drops. The session
//! is an explicitly passed value rather than ambient global state, so every
//! service call names the identity it acts for.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Validation errors for authentication primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Identity id was empty.
    EmptyIdentityId,
    /// Identity id carried surrounding whitespace.
    PaddedIdentityId,
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyIdentityId => write!(f, "identity id must not be empty"),
            Self::PaddedIdentityId => {
                write!(f, "identity id must not contain surrounding whitespace")
            }
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

/// Opaque identifier issued by the identity provider.
///
/// Doubles as the record key in the document store.
///
/// # Examples
/// ```
/// use clinic_accounts::domain::IdentityId;
///
/// let id = IdentityId::new("b1946ac9-2ea9-4a31-8c4d-0f86f0d5a3b2").expect("valid id");
/// assert_eq!(id.as_str(), "b1946ac9-2ea9-4a31-8c4d-0f86f0d5a3b2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityId(String);

impl IdentityId {
    /// Validate and construct an [`IdentityId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AuthValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a fresh random identity id.
    ///
    /// Used by fixture providers and tests; real ids come from the
    /// collaborator.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    fn from_owned(id: String) -> Result<Self, AuthValidationError> {
        if id.is_empty() {
            return Err(AuthValidationError::EmptyIdentityId);
        }
        if id.trim() != id {
            return Err(AuthValidationError::PaddedIdentityId);
        }
        Ok(Self(id))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for IdentityId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<IdentityId> for String {
    fn from(value: IdentityId) -> Self {
        value.0
    }
}

impl TryFrom<String> for IdentityId {
    type Error = AuthValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Email and password handed to the identity provider at registration.
///
/// ## Invariants
/// - `email` is trimmed and non-empty; its full shape is enforced earlier by
///   the email field validator.
/// - `password` is non-empty and retains caller-provided whitespace. No
///   local strength rule exists; the identity provider is authoritative and
///   its weak-password rejections are surfaced verbatim.
///
/// # Examples
/// ```
/// use clinic_accounts::domain::SignupCredentials;
///
/// let creds = SignupCredentials::try_from_parts("ada@example.com", "hunter22")
///     .expect("valid credentials");
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "hunter22");
/// ```
#[derive(Debug, Clone)]
pub struct SignupCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl SignupCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(AuthValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used as the login identifier.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Authentication context passed explicitly into profile services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    identity: Option<IdentityId>,
}

impl AuthSession {
    /// Session with no authenticated identity.
    pub const fn anonymous() -> Self {
        Self { identity: None }
    }

    /// Session for an authenticated identity.
    pub const fn authenticated(identity: IdentityId) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Authenticated identity, if any.
    pub const fn identity(&self) -> Option<&IdentityId> {
        self.identity.as_ref()
    }
}
