//! Collaborator contracts consumed by the domain.
//!
//! Ports describe how the domain expects to interact with the external
//! identity provider and document store. Each trait exposes strongly typed
//! errors so adapters map their failures into predictable variants, and each
//! failure reason is surfaced to the user verbatim through `Display`.

mod identity_provider;
mod user_store;

#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityError, IdentityProvider};
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{FixtureUserStore, StoreError, USERS_COLLECTION, UserStore};
