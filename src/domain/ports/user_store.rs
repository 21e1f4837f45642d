//! Port for the external document store holding user records.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::auth::IdentityId;
use crate::domain::record::{ProfileUpdate, UserRecord};

/// The single collection shared by both roles, discriminated by the `role`
/// field on each record.
pub const USERS_COLLECTION: &str = "users";

/// Failure reasons reported by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store connectivity failure.
    #[error("document store unreachable: {message}")]
    Connection { message: String },
    /// A read or write was rejected by the store.
    #[error("document store request failed: {message}")]
    Write { message: String },
    /// An update targeted a record that does not exist.
    #[error("no record exists for id {id}")]
    NotFound { id: String },
}

impl StoreError {
    /// Helper for connectivity failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for rejected reads and writes.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Helper for updates against missing records.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

/// Keyed record store over the fixed [`USERS_COLLECTION`].
///
/// The store enforces no constraints of its own; every invariant on record
/// content is this crate's job before a write is issued. Writes are
/// last-write-wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch the record keyed by `id`, or `None` when absent.
    async fn find(&self, id: &IdentityId) -> Result<Option<UserRecord>, StoreError>;

    /// Create the record keyed by `id`.
    async fn create(&self, id: &IdentityId, record: &UserRecord) -> Result<(), StoreError>;

    /// Apply a targeted update to the record keyed by `id`.
    async fn update(&self, id: &IdentityId, update: &ProfileUpdate) -> Result<(), StoreError>;
}

/// Fixture store that finds nothing and accepts every write.
///
/// Use it in unit tests where store behaviour is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserStore;

#[async_trait]
impl UserStore for FixtureUserStore {
    async fn find(&self, _id: &IdentityId) -> Result<Option<UserRecord>, StoreError> {
        Ok(None)
    }

    async fn create(&self, _id: &IdentityId, _record: &UserRecord) -> Result<(), StoreError> {
        Ok(())
    }

    async fn update(&self, _id: &IdentityId, _update: &ProfileUpdate) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn fixture_store_finds_nothing_and_accepts_writes() {
        let store = FixtureUserStore;
        let id = IdentityId::random();

        let found = store.find(&id).await.expect("find succeeds");
        assert!(found.is_none());

        let update = ProfileUpdate::Patient {
            name: "Ada Byrne".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "0871234567".to_owned(),
            age: "34".to_owned(),
        };
        store.update(&id, &update).await.expect("update succeeds");
    }

    #[test]
    fn failure_reasons_surface_verbatim() {
        assert_eq!(
            StoreError::connection("timed out").to_string(),
            "document store unreachable: timed out"
        );
        assert_eq!(
            StoreError::write("permission denied").to_string(),
            "document store request failed: permission denied"
        );
        assert_eq!(
            StoreError::not_found("uid-1").to_string(),
            "no record exists for id uid-1"
        );
    }
}
