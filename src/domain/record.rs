//! Persisted user record shapes and the role record shaper.
//!
//! Records live in a single `users` collection in the document store,
//! discriminated by the `role` field. The field set present on a record is
//! fully determined by its role; no cross-role field is ever written. The
//! store performs no validation of its own, so records are only built from
//! forms that already passed [`crate::domain::FormState::validate_all`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::form::FormState;
use crate::domain::validation::Field;

/// Fixed specialization catalogue offered on the doctor screens.
pub const SPECIALIZATIONS: &[&str] = &[
    "Cardiology",
    "Dermatology",
    "Neurology",
    "Pediatrics",
    "Orthopedics",
    "Psychiatry",
    "General Medicine",
    "Surgery",
    "Ophthalmology",
    "ENT",
];

/// Sentinel select value that activates the free-text specialization field.
pub const SPECIALIZATION_OTHER: &str = "Others";

/// Account role; immutable once the record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    /// Wire value stored in the `role` discriminator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role-owned portion of a persisted record.
///
/// Serialises with the `role` discriminator inline, producing the flat
/// document shape: `{"role": "patient", "phone": ..., "age": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    #[serde(rename_all = "camelCase")]
    Patient {
        #[serde(default)]
        phone: String,
        /// Persisted as the validated string, exactly what the age
        /// validator checked.
        #[serde(default)]
        age: String,
    },
    #[serde(rename_all = "camelCase")]
    Doctor {
        /// Resolved value: the free-text entry when the sentinel was
        /// selected, otherwise the catalogue value verbatim. The sentinel
        /// itself is never persisted.
        #[serde(default)]
        specialization: String,
        #[serde(default)]
        license_number: String,
    },
}

impl RoleProfile {
    /// Role owning this field set.
    pub const fn role(&self) -> Role {
        match self {
            Self::Patient { .. } => Role::Patient,
            Self::Doctor { .. } => Role::Doctor,
        }
    }
}

/// Persisted user record, keyed in the store by the identity id.
///
/// ## Invariants
/// - `role` determines the exact field set; no cross-role field is present.
/// - Created once at registration; later mutated in place by edit flows
///   restricted to the role's owned fields; never deleted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(flatten)]
    profile: RoleProfile,
}

impl UserRecord {
    /// Shape a record from a validated form.
    ///
    /// The role comes from the screen's [`crate::domain::FormKind`], never
    /// from user input, so a tampered form value can never change the role a
    /// record is written under.
    pub fn from_validated_form(form: &FormState) -> Self {
        let profile = match form.kind().role() {
            Role::Patient => RoleProfile::Patient {
                phone: form.value(Field::Phone).to_owned(),
                age: form.value(Field::Age).to_owned(),
            },
            Role::Doctor => RoleProfile::Doctor {
                specialization: resolve_specialization(form),
                license_number: form.value(Field::LicenseNumber).to_owned(),
            },
        };
        Self {
            name: form.value(Field::Name).to_owned(),
            email: form.value(Field::Email).to_owned(),
            profile,
        }
    }

    /// Account role.
    pub const fn role(&self) -> Role {
        self.profile.role()
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Login email, also stored on the record.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Role-owned fields.
    pub const fn profile(&self) -> &RoleProfile {
        &self.profile
    }

    /// Apply a role-matching targeted update in place.
    ///
    /// The role discriminator is untouched. Returns false (and leaves the
    /// record unchanged) when the update belongs to the other role.
    pub fn apply(&mut self, update: &ProfileUpdate) -> bool {
        if update.role() != self.role() {
            return false;
        }
        match update {
            ProfileUpdate::Patient {
                name,
                email,
                phone,
                age,
            } => {
                self.name = name.clone();
                self.email = email.clone();
                self.profile = RoleProfile::Patient {
                    phone: phone.clone(),
                    age: age.clone(),
                };
            }
            ProfileUpdate::Doctor {
                name,
                email,
                specialization,
                license_number,
            } => {
                self.name = name.clone();
                self.email = email.clone();
                self.profile = RoleProfile::Doctor {
                    specialization: specialization.clone(),
                    license_number: license_number.clone(),
                };
            }
        }
        true
    }
}

/// Targeted update for the fields a role owns.
///
/// Serialises to the flat document shape without the `role` discriminator:
/// edit flows never rewrite the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProfileUpdate {
    #[serde(rename_all = "camelCase")]
    Patient {
        name: String,
        email: String,
        phone: String,
        age: String,
    },
    #[serde(rename_all = "camelCase")]
    Doctor {
        name: String,
        email: String,
        specialization: String,
        license_number: String,
    },
}

impl ProfileUpdate {
    /// Shape an update from a validated edit form.
    pub fn from_validated_form(form: &FormState) -> Self {
        let name = form.value(Field::Name).to_owned();
        let email = form.value(Field::Email).to_owned();
        match form.kind().role() {
            Role::Patient => Self::Patient {
                name,
                email,
                phone: form.value(Field::Phone).to_owned(),
                age: form.value(Field::Age).to_owned(),
            },
            Role::Doctor => Self::Doctor {
                name,
                email,
                specialization: resolve_specialization(form),
                license_number: form.value(Field::LicenseNumber).to_owned(),
            },
        }
    }

    /// Role whose fields this update carries.
    pub const fn role(&self) -> Role {
        match self {
            Self::Patient { .. } => Role::Patient,
            Self::Doctor { .. } => Role::Doctor,
        }
    }
}

/// Resolve the persisted specialization from the select and free-text pair.
fn resolve_specialization(form: &FormState) -> String {
    let selected = form.value(Field::Specialization);
    if selected == SPECIALIZATION_OTHER {
        form.value(Field::OtherSpecialization).to_owned()
    } else {
        selected.to_owned()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::form::FormKind;
    use rstest::rstest;
    use serde_json::json;

    fn doctor_form(specialization: &str, other: &str) -> FormState {
        let mut form = FormState::new(FormKind::DoctorRegistration);
        form.set_value(Field::Name, "Dr Byrne");
        form.set_value(Field::Email, "byrne@clinic.example");
        form.set_value(Field::Password, "secret");
        form.set_value(Field::Specialization, specialization);
        form.set_value(Field::OtherSpecialization, other);
        form.set_value(Field::LicenseNumber, "1234567");
        assert!(form.validate_all(), "fixture form must validate");
        form
    }

    #[rstest]
    fn sentinel_specialization_resolves_to_free_text() {
        let form = doctor_form(SPECIALIZATION_OTHER, "Oncology");
        let record = UserRecord::from_validated_form(&form);
        assert_eq!(
            record.profile(),
            &RoleProfile::Doctor {
                specialization: "Oncology".to_owned(),
                license_number: "1234567".to_owned(),
            }
        );
    }

    #[rstest]
    fn catalogue_specialization_is_stored_verbatim() {
        let form = doctor_form("Cardiology", "");
        let record = UserRecord::from_validated_form(&form);
        let RoleProfile::Doctor { specialization, .. } = record.profile() else {
            panic!("doctor form must shape a doctor profile");
        };
        assert_eq!(specialization, "Cardiology");
    }

    #[rstest]
    fn patient_record_serialises_to_flat_document() {
        let mut form = FormState::new(FormKind::PatientRegistration);
        form.set_value(Field::Name, "Ada Byrne");
        form.set_value(Field::Email, "ada@example.com");
        form.set_value(Field::Password, "hunter22");
        form.set_value(Field::Phone, "0871234567");
        form.set_value(Field::Age, "34");
        assert!(form.validate_all());

        let record = UserRecord::from_validated_form(&form);
        let value = serde_json::to_value(&record).expect("record serialises");
        assert_eq!(
            value,
            json!({
                "name": "Ada Byrne",
                "email": "ada@example.com",
                "phone": "0871234567",
                "age": "34",
                "role": "patient",
            })
        );
        // The password never reaches the persisted record.
        assert!(value.get("password").is_none());
    }

    #[rstest]
    fn records_deserialise_with_absent_optional_fields() {
        let record: UserRecord = serde_json::from_value(json!({
            "role": "doctor",
            "name": "Dr Byrne",
        }))
        .expect("partial document deserialises");
        assert_eq!(record.role(), Role::Doctor);
        assert_eq!(record.email(), "");
        assert_eq!(
            record.profile(),
            &RoleProfile::Doctor {
                specialization: String::new(),
                license_number: String::new(),
            }
        );
    }

    #[rstest]
    fn updates_never_carry_the_role_discriminator() {
        let mut form = FormState::seeded(
            FormKind::EditProfile(Role::Patient),
            [
                (Field::Name, "Ada Byrne".to_owned()),
                (Field::Email, "ada@example.com".to_owned()),
                (Field::Phone, "0871234567".to_owned()),
                (Field::Age, "35".to_owned()),
            ],
        );
        assert!(form.validate_all());

        let update = ProfileUpdate::from_validated_form(&form);
        let value = serde_json::to_value(&update).expect("update serialises");
        assert!(value.get("role").is_none());
        assert_eq!(value.get("age"), Some(&json!("35")));
    }

    #[rstest]
    fn cross_role_update_is_rejected() {
        let form = doctor_form("Cardiology", "");
        let mut record = UserRecord::from_validated_form(&form);
        let update = ProfileUpdate::Patient {
            name: "Mallory".to_owned(),
            email: "mallory@example.com".to_owned(),
            phone: "000".to_owned(),
            age: "30".to_owned(),
        };

        assert!(!record.apply(&update));
        assert_eq!(record.name(), "Dr Byrne");
        assert_eq!(record.role(), Role::Doctor);
    }

    #[rstest]
    fn matching_update_applies_in_place() {
        let form = doctor_form("Cardiology", "");
        let mut record = UserRecord::from_validated_form(&form);
        let update = ProfileUpdate::Doctor {
            name: "Dr Byrne".to_owned(),
            email: "byrne@clinic.example".to_owned(),
            specialization: "Neurology".to_owned(),
            license_number: "7654321".to_owned(),
        };

        assert!(record.apply(&update));
        assert_eq!(
            record.profile(),
            &RoleProfile::Doctor {
                specialization: "Neurology".to_owned(),
                license_number: "7654321".to_owned(),
            }
        );
        assert_eq!(record.role(), Role::Doctor);
    }
}
