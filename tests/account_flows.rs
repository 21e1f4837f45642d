//! End-to-end flows over in-memory collaborator adapters.
//!
//! These tests wire the registration and edit flows against doubles that
//! actually hold state, so partial-commit behaviour (the orphaned identity)
//! and loader seeding are observable rather than mocked.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clinic_accounts::domain::ports::{
    IdentityError, IdentityProvider, StoreError, USERS_COLLECTION, UserStore,
};
use clinic_accounts::domain::{
    AuthSession, Field, FormKind, FormState, IdentityId, ProfileEditFlow, ProfileLoadOutcome,
    ProfileLoader, ProfileUpdate, Redirect, RegistrationFlow, Role, SignupCredentials,
    SubmissionError, SubmissionState, UserRecord,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Identity provider double that records issued identities and can be primed
/// to reject the next request.
#[derive(Default)]
struct RecordingIdentityProvider {
    issued: Mutex<Vec<(String, IdentityId)>>,
    reject_next: Mutex<Option<IdentityError>>,
}

impl RecordingIdentityProvider {
    fn reject_next(&self, error: IdentityError) {
        *self.reject_next.lock().expect("provider poisoned") = Some(error);
    }

    fn identity_for(&self, email: &str) -> Option<IdentityId> {
        let issued = self.issued.lock().expect("provider poisoned");
        issued
            .iter()
            .find(|(issued_email, _)| issued_email == email)
            .map(|(_, id)| id.clone())
    }
}

#[async_trait]
impl IdentityProvider for RecordingIdentityProvider {
    async fn create_identity(
        &self,
        credentials: &SignupCredentials,
    ) -> Result<IdentityId, IdentityError> {
        if let Some(error) = self.reject_next.lock().expect("provider poisoned").take() {
            return Err(error);
        }
        {
            let issued = self.issued.lock().expect("provider poisoned");
            if issued.iter().any(|(email, _)| email == credentials.email()) {
                return Err(IdentityError::EmailAlreadyInUse);
            }
        }
        let id = IdentityId::random();
        self.issued
            .lock()
            .expect("provider poisoned")
            .push((credentials.email().to_owned(), id.clone()));
        Ok(id)
    }
}

/// Document store double keyed by collection name, with a switch to fail
/// the next create. Both roles land under [`USERS_COLLECTION`], exactly as
/// the real store namespaces them.
#[derive(Default)]
struct InMemoryUserStore {
    collections: Mutex<HashMap<String, HashMap<IdentityId, UserRecord>>>,
    fail_next_create: Mutex<Option<StoreError>>,
}

impl InMemoryUserStore {
    fn fail_next_create(&self, error: StoreError) {
        *self.fail_next_create.lock().expect("store poisoned") = Some(error);
    }

    fn record(&self, id: &IdentityId) -> Option<UserRecord> {
        let collections = self.collections.lock().expect("store poisoned");
        collections
            .get(USERS_COLLECTION)
            .and_then(|users| users.get(id))
            .cloned()
    }

    fn user_count(&self) -> usize {
        let collections = self.collections.lock().expect("store poisoned");
        collections.get(USERS_COLLECTION).map_or(0, HashMap::len)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find(&self, id: &IdentityId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.record(id))
    }

    async fn create(&self, id: &IdentityId, record: &UserRecord) -> Result<(), StoreError> {
        if let Some(error) = self.fail_next_create.lock().expect("store poisoned").take() {
            return Err(error);
        }
        self.collections
            .lock()
            .expect("store poisoned")
            .entry(USERS_COLLECTION.to_owned())
            .or_default()
            .insert(id.clone(), record.clone());
        Ok(())
    }

    async fn update(&self, id: &IdentityId, update: &ProfileUpdate) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().expect("store poisoned");
        let Some(record) = collections
            .get_mut(USERS_COLLECTION)
            .and_then(|users| users.get_mut(id))
        else {
            return Err(StoreError::not_found(id.as_str()));
        };
        if !record.apply(update) {
            return Err(StoreError::write("update role does not match record"));
        }
        Ok(())
    }
}

fn patient_registration_form() -> FormState {
    let mut form = FormState::new(FormKind::PatientRegistration);
    form.set_value(Field::Name, "Ada Byrne");
    form.set_value(Field::Email, "ada@example.com");
    form.set_value(Field::Password, "hunter22");
    form.set_value(Field::Phone, "+353 87 555 0100");
    form.set_value(Field::Age, "34");
    form
}

fn doctor_registration_form() -> FormState {
    let mut form = FormState::new(FormKind::DoctorRegistration);
    form.set_value(Field::Name, "Dr Byrne");
    form.set_value(Field::Email, "byrne@clinic.example");
    form.set_value(Field::Password, "secret");
    form.set_value(Field::Specialization, "Others");
    form.set_value(Field::OtherSpecialization, "Oncology");
    form.set_value(Field::LicenseNumber, "1234567");
    form
}

#[tokio::test]
async fn patient_registration_persists_a_role_tagged_record() {
    init_tracing();
    let provider = Arc::new(RecordingIdentityProvider::default());
    let store = Arc::new(InMemoryUserStore::default());

    let mut form = patient_registration_form();
    let mut flow = RegistrationFlow::new(Arc::clone(&provider), Arc::clone(&store));
    let success = flow.submit(&mut form).await.expect("registration succeeds");

    assert_eq!(success.redirect, Redirect::Login);
    let record = store.record(&success.identity_id).expect("record persisted");
    assert_eq!(record.role(), Role::Patient);
    assert_eq!(record.email(), "ada@example.com");
}

#[tokio::test]
async fn doctor_registration_resolves_the_specialization_sentinel() {
    init_tracing();
    let provider = Arc::new(RecordingIdentityProvider::default());
    let store = Arc::new(InMemoryUserStore::default());

    let mut form = doctor_registration_form();
    let mut flow = RegistrationFlow::new(Arc::clone(&provider), Arc::clone(&store));
    let success = flow.submit(&mut form).await.expect("registration succeeds");

    let record = store.record(&success.identity_id).expect("record persisted");
    let value = serde_json::to_value(&record).expect("record serialises");
    assert_eq!(value["specialization"], "Oncology");
    assert_eq!(value["role"], "doctor");
}

#[tokio::test]
async fn duplicate_email_registration_never_reaches_the_store() {
    init_tracing();
    let provider = Arc::new(RecordingIdentityProvider::default());
    let store = Arc::new(InMemoryUserStore::default());

    let mut first = patient_registration_form();
    RegistrationFlow::new(Arc::clone(&provider), Arc::clone(&store))
        .submit(&mut first)
        .await
        .expect("first registration succeeds");

    let mut second = patient_registration_form();
    let mut flow = RegistrationFlow::new(Arc::clone(&provider), Arc::clone(&store));
    let err = flow.submit(&mut second).await.expect_err("duplicate must fail");

    assert_eq!(err, SubmissionError::Identity(IdentityError::EmailAlreadyInUse));
    assert_eq!(flow.state(), SubmissionState::Failed);
    assert_eq!(store.user_count(), 1);
}

#[tokio::test]
async fn failed_persistence_orphans_the_identity_until_retried() {
    init_tracing();
    let provider = Arc::new(RecordingIdentityProvider::default());
    let store = Arc::new(InMemoryUserStore::default());
    store.fail_next_create(StoreError::write("permission denied"));

    let mut form = doctor_registration_form();
    let mut flow = RegistrationFlow::new(Arc::clone(&provider), Arc::clone(&store));
    let err = flow.submit(&mut form).await.expect_err("persistence must fail");

    let SubmissionError::Persistence { identity_id, .. } = err else {
        panic!("expected a persistence failure, got {err:?}");
    };
    // The identity survives the failed write with no record behind it.
    assert_eq!(
        provider.identity_for("byrne@clinic.example"),
        Some(identity_id.clone())
    );
    assert!(store.record(&identity_id).is_none());

    // Retrying persistence reuses the identity; no second provider call.
    let success = flow
        .persist_record_for(identity_id.clone(), &mut form)
        .await
        .expect("retry succeeds");
    assert_eq!(success.identity_id, identity_id);
    assert!(store.record(&identity_id).is_some());
    assert_eq!(provider.issued.lock().expect("provider poisoned").len(), 1);
}

#[tokio::test]
async fn edit_flow_round_trips_through_loader_and_update() {
    init_tracing();
    let provider = Arc::new(RecordingIdentityProvider::default());
    let store = Arc::new(InMemoryUserStore::default());

    let mut registration = patient_registration_form();
    let success = RegistrationFlow::new(Arc::clone(&provider), Arc::clone(&store))
        .submit(&mut registration)
        .await
        .expect("registration succeeds");

    let session = AuthSession::authenticated(success.identity_id.clone());
    let loader = ProfileLoader::new(Arc::clone(&store));
    let outcome = loader
        .load(&session, FormKind::EditProfile(Role::Patient))
        .await
        .expect("load succeeds");
    let ProfileLoadOutcome::Form(mut form) = outcome else {
        panic!("expected a seeded form, got {outcome:?}");
    };
    assert_eq!(form.value(Field::Age), "34");

    form.set_value(Field::Age, "35");
    let mut flow = ProfileEditFlow::new(Arc::clone(&store));
    flow.submit(&session, &mut form).await.expect("edit succeeds");

    let record = store.record(&success.identity_id).expect("record still there");
    let value = serde_json::to_value(&record).expect("record serialises");
    assert_eq!(value["age"], "35");
    assert_eq!(value["role"], "patient");
}

#[tokio::test]
async fn edit_against_the_wrong_screen_is_rejected() {
    init_tracing();
    let provider = Arc::new(RecordingIdentityProvider::default());
    let store = Arc::new(InMemoryUserStore::default());

    let mut registration = patient_registration_form();
    let success = RegistrationFlow::new(Arc::clone(&provider), Arc::clone(&store))
        .submit(&mut registration)
        .await
        .expect("registration succeeds");

    let session = AuthSession::authenticated(success.identity_id);
    let loader = ProfileLoader::new(Arc::clone(&store));
    let outcome = loader
        .load(&session, FormKind::EditProfile(Role::Doctor))
        .await
        .expect("load succeeds");

    assert_eq!(
        outcome,
        ProfileLoadOutcome::RoleMismatch {
            expected: Role::Doctor,
            found: Role::Patient,
        }
    );
}
