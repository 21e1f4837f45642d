//! Profile loading for the edit screens.
//!
//! On screen entry the loader checks the session, fetches the record keyed
//! by the authenticated identity, and seeds a form with the subset of fields
//! the screen's role owns. A role mismatch is an explicit outcome rather
//! than a silently empty form.

use std::sync::Arc;

use tracing::warn;

use crate::domain::auth::AuthSession;
use crate::domain::form::{FormKind, FormState};
use crate::domain::ports::{StoreError, UserStore};
use crate::domain::record::{Role, RoleProfile, SPECIALIZATION_OTHER, SPECIALIZATIONS, UserRecord};
use crate::domain::validation::Field;

/// Terminal outcomes of a profile load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLoadOutcome {
    /// A form seeded from the fetched record, ready for editing.
    Form(FormState),
    /// No authenticated identity; the interface redirects to login without
    /// any record fetch having been attempted.
    RedirectToLogin,
    /// The identity has no record in the store.
    RecordMissing,
    /// The stored record belongs to the other role.
    RoleMismatch { expected: Role, found: Role },
}

/// Seeds edit forms from persisted records.
pub struct ProfileLoader<S> {
    users: Arc<S>,
}

impl<S> ProfileLoader<S>
where
    S: UserStore,
{
    /// Create a loader over the given store.
    pub fn new(users: Arc<S>) -> Self {
        Self { users }
    }

    /// Load the record for the session's identity and seed a form for the
    /// given edit screen.
    ///
    /// Store failures propagate; every other case maps to a
    /// [`ProfileLoadOutcome`].
    pub async fn load(
        &self,
        session: &AuthSession,
        kind: FormKind,
    ) -> Result<ProfileLoadOutcome, StoreError> {
        let Some(identity_id) = session.identity() else {
            return Ok(ProfileLoadOutcome::RedirectToLogin);
        };
        let Some(record) = self.users.find(identity_id).await? else {
            return Ok(ProfileLoadOutcome::RecordMissing);
        };

        let expected = kind.role();
        if record.role() != expected {
            warn!(%identity_id, found = %record.role(), %expected, "role mismatch on load");
            return Ok(ProfileLoadOutcome::RoleMismatch {
                expected,
                found: record.role(),
            });
        }

        Ok(ProfileLoadOutcome::Form(FormState::seeded(
            kind,
            seed_fields(&record),
        )))
    }
}

/// Field values a record contributes to its role's edit form.
///
/// Absent fields stay at the form's empty-string default. A stored doctor
/// specialization outside the fixed catalogue seeds the `Others` sentinel
/// plus the free-text field, mirroring how the value was entered.
fn seed_fields(record: &UserRecord) -> Vec<(Field, String)> {
    let mut seed = vec![
        (Field::Name, record.name().to_owned()),
        (Field::Email, record.email().to_owned()),
    ];
    match record.profile() {
        RoleProfile::Patient { phone, age } => {
            seed.push((Field::Phone, phone.clone()));
            seed.push((Field::Age, age.clone()));
        }
        RoleProfile::Doctor {
            specialization,
            license_number,
        } => {
            if SPECIALIZATIONS.contains(&specialization.as_str()) {
                seed.push((Field::Specialization, specialization.clone()));
            } else {
                seed.push((Field::Specialization, SPECIALIZATION_OTHER.to_owned()));
                seed.push((Field::OtherSpecialization, specialization.clone()));
            }
            seed.push((Field::LicenseNumber, license_number.clone()));
        }
    }
    seed
}
