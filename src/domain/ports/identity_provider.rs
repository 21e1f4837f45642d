//! Port for the external identity provider.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::auth::{IdentityId, SignupCredentials};

/// Failure reasons reported by the identity provider.
///
/// Display output is shown to the user as a single top-level message, never
/// attached to an individual field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Another identity already uses this email.
    #[error("email address is already in use")]
    EmailAlreadyInUse,
    /// The provider rejected the password as too weak.
    #[error("password is too weak: {message}")]
    WeakPassword { message: String },
    /// The provider could not be reached or answered with a transport-level
    /// failure.
    #[error("identity provider unreachable: {message}")]
    Transport { message: String },
}

impl IdentityError {
    /// Helper for weak-password rejections.
    pub fn weak_password(message: impl Into<String>) -> Self {
        Self::WeakPassword {
            message: message.into(),
        }
    }

    /// Helper for transport failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// External service issuing a unique identifier for an email/password pair.
///
/// Creating an identity is the first half of the registration commit; the
/// issued id becomes the record key in the document store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register the credentials and return the new identity id.
    async fn create_identity(
        &self,
        credentials: &SignupCredentials,
    ) -> Result<IdentityId, IdentityError>;
}

/// Fixture provider that accepts any credentials and issues random ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn create_identity(
        &self,
        _credentials: &SignupCredentials,
    ) -> Result<IdentityId, IdentityError> {
        Ok(IdentityId::random())
    }
}
