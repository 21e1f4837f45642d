//! Per-screen form state.
//!
//! A [`FormState`] holds the current field values and per-field errors for
//! one screen. The source behaviour validated only some fields on keystroke
//! and the rest at submit; here every active field validates on both paths
//! so the inline errors and the submit gate can never disagree.

use std::collections::HashMap;

use crate::domain::record::{Role, SPECIALIZATION_OTHER};
use crate::domain::validation::{Field, FieldError, validate};

/// Screen discriminator fixing the field set and declared field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    /// Patient self-registration.
    PatientRegistration,
    /// Doctor self-registration.
    DoctorRegistration,
    /// Profile editing for an existing account of the given role.
    EditProfile(Role),
}

impl FormKind {
    /// Role stamped onto records built from this screen.
    ///
    /// Always fixed by the screen, never read from user input.
    pub const fn role(self) -> Role {
        match self {
            Self::PatientRegistration | Self::EditProfile(Role::Patient) => Role::Patient,
            Self::DoctorRegistration | Self::EditProfile(Role::Doctor) => Role::Doctor,
        }
    }

    /// Declared fields for the screen, in display order.
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::PatientRegistration => &[
                Field::Name,
                Field::Email,
                Field::Password,
                Field::Phone,
                Field::Age,
            ],
            Self::DoctorRegistration => &[
                Field::Name,
                Field::Email,
                Field::Password,
                Field::Specialization,
                Field::OtherSpecialization,
                Field::LicenseNumber,
            ],
            Self::EditProfile(Role::Patient) => {
                &[Field::Name, Field::Email, Field::Phone, Field::Age]
            }
            Self::EditProfile(Role::Doctor) => &[
                Field::Name,
                Field::Email,
                Field::Specialization,
                Field::OtherSpecialization,
                Field::LicenseNumber,
            ],
        }
    }

    const fn is_edit(self) -> bool {
        matches!(self, Self::EditProfile(_))
    }

    fn declares(self, field: Field) -> bool {
        self.fields().contains(&field)
    }
}

/// Field values and live validation errors for one screen.
///
/// ## Invariants
/// - `values` holds exactly the declared fields of the screen's [`FormKind`].
/// - An error is recorded for a field iff the last validation run on its
///   value failed.
///
/// Created empty for registration screens or seeded from a fetched record
/// for edit screens, mutated on every keystroke and at submit, and discarded
/// with the screen.
///
/// # Examples
/// ```
/// use clinic_accounts::domain::{Field, FormKind, FormState};
///
/// let mut form = FormState::new(FormKind::PatientRegistration);
/// form.set_value(Field::Age, "0");
/// assert!(form.error(Field::Age).is_some());
///
/// form.set_value(Field::Age, "34");
/// assert!(form.error(Field::Age).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    kind: FormKind,
    values: HashMap<Field, String>,
    errors: HashMap<Field, FieldError>,
}

impl FormState {
    /// Create an empty form for the given screen.
    pub fn new(kind: FormKind) -> Self {
        let values = kind
            .fields()
            .iter()
            .map(|&field| (field, String::new()))
            .collect();
        Self {
            kind,
            values,
            errors: HashMap::new(),
        }
    }

    /// Create a form pre-populated with fetched values, without running
    /// validators.
    ///
    /// Fields not present in `seed` default to the empty string; entries for
    /// undeclared fields are dropped.
    pub fn seeded(kind: FormKind, seed: impl IntoIterator<Item = (Field, String)>) -> Self {
        let mut form = Self::new(kind);
        for (field, value) in seed {
            if kind.declares(field) {
                form.values.insert(field, value);
            }
        }
        form
    }

    /// Screen this form belongs to.
    pub const fn kind(&self) -> FormKind {
        self.kind
    }

    /// Current value of a field; empty string for undeclared fields.
    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    /// Active validation error for a field, if any.
    pub fn error(&self, field: Field) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    /// Declared fields and their current values, in display order.
    pub fn entries(&self) -> impl Iterator<Item = (Field, &str)> {
        self.kind.fields().iter().map(|&field| (field, self.value(field)))
    }

    /// Overwrite a field's value and re-validate it.
    ///
    /// Writes to undeclared fields are ignored. Changing the specialization
    /// away from the `Others` sentinel clears any stale error on the
    /// free-text field, which is no longer active.
    pub fn set_value(&mut self, field: Field, value: impl Into<String>) {
        if !self.kind.declares(field) {
            return;
        }
        self.values.insert(field, value.into());
        self.run_validator(field);
        if field == Field::Specialization && !self.is_active(Field::OtherSpecialization) {
            self.errors.remove(&Field::OtherSpecialization);
        }
    }

    /// Run every active validator over the current values.
    ///
    /// Returns true iff no validator produced an error. Used as the submit
    /// gate; inline errors are refreshed as a side effect.
    pub fn validate_all(&mut self) -> bool {
        let mut ok = true;
        for &field in self.kind.fields() {
            if !self.is_active(field) {
                self.errors.remove(&field);
                continue;
            }
            if !self.run_validator(field) {
                ok = false;
            }
        }
        ok
    }

    /// Whether the submit button should be enabled.
    ///
    /// No active field may carry an error; edit screens additionally require
    /// every active field to be non-blank.
    pub fn can_submit(&self) -> bool {
        let active = self
            .kind
            .fields()
            .iter()
            .copied()
            .filter(|&field| self.is_active(field));
        for field in active {
            if self.errors.contains_key(&field) {
                return false;
            }
            if self.kind.is_edit() && self.value(field).trim().is_empty() {
                return false;
            }
        }
        true
    }

    /// The free-text specialization is only active while the `Others`
    /// sentinel is selected; every other declared field is always active.
    fn is_active(&self, field: Field) -> bool {
        if field == Field::OtherSpecialization {
            self.value(Field::Specialization) == SPECIALIZATION_OTHER
        } else {
            self.kind.declares(field)
        }
    }

    fn run_validator(&mut self, field: Field) -> bool {
        if !self.is_active(field) {
            self.errors.remove(&field);
            return true;
        }
        match validate(field, self.value(field)) {
            Ok(()) => {
                self.errors.remove(&field);
                true
            }
            Err(error) => {
                self.errors.insert(field, error);
                false
            }
        }
    }
}
