//! Patient onboarding orchestration.
//!
//! Sequences the multi-step save protocol under one constraint: **file
//! uploads require a persisted patient identity**. The session is therefore
//! a type-state machine:
//!
//! - [`Onboarding<Draft>`] — no id exists. Steps edit the in-memory draft;
//!   [`create`](Onboarding::<Draft>::create) validates Personal+Contact and
//!   issues one partial insert carrying only those fields, yielding
//!   [`Onboarding<Created>`] with the assigned id.
//! - [`Onboarding<Created>`] — later steps keep editing the draft; each
//!   `complete_*` call validates only the fields of the step being left.
//!   [`submit`](Onboarding::<Created>::submit) uploads every pending file,
//!   applies the attachment policy and issues one merged update.
//!
//! Failure leaves state at the failing step: a consumed-on-success
//! `create` hands the draft session back alongside the error, and `submit`
//! commits nothing locally until the backend accepted the update.

use crate::auth::require_session;
use crate::config::CoreConfig;
use crate::constants::PATIENTS_TABLE;
use crate::error::{ClinicError, ClinicResult};
use crate::patients::documents::{attach, Document, DocumentService};
use crate::patients::{Patient, PatientId};
use crate::shared::{date_string, json_object};
use dpm_backend::{row_to, Backend, BackendError, Row};
use dpm_files::{DocumentKind, PendingUpload};
use dpm_forms::steps::{
    consent, contact, dental, family, lifestyle, medical, personal, ConsentData, ConsentInput,
    ContactData, ContactInput, DentalData, DentalInput, FamilyData, FamilyInput, LifestyleData,
    LifestyleInput, MedicalData, MedicalInput, PersonalData, PersonalInput,
};
use dpm_forms::{FieldErrors, OnboardingStep, StepController};
use serde_json::json;
use std::sync::Arc;

// ============================================================================
// TYPE-STATE MARKERS
// ============================================================================

/// Marker type: no patient record exists yet.
///
/// File uploads are impossible in this state; only `create()` leaves it.
#[derive(Clone, Copy, Debug)]
pub struct Draft;

/// Marker type: the partial create succeeded and an id is assigned.
#[derive(Clone, Debug)]
pub struct Created {
    patient_id: PatientId,
}

// ============================================================================
// DRAFT AGGREGATE
// ============================================================================

/// Transient client-side aggregate of all step values.
///
/// Holds validated step data once the corresponding step was completed,
/// pending file handles awaiting upload, and the documents already attached
/// to the persisted record.
#[derive(Clone, Debug, Default)]
pub struct PatientDraft {
    pub personal: Option<PersonalData>,
    pub contact: Option<ContactData>,
    pub medical: Option<MedicalData>,
    pub dental: Option<DentalData>,
    pub family: Option<FamilyData>,
    pub lifestyle: Option<LifestyleData>,
    pub consent: Option<ConsentData>,
    pub pending_files: Vec<PendingUpload>,
    pub documents: Vec<Document>,
}

// ============================================================================
// ONBOARDING SESSION
// ============================================================================

/// One patient's intake session.
///
/// Generic parameter `S` is either [`Draft`] or [`Created`]; operations
/// that need a persisted identity only exist on `Onboarding<Created>`.
#[derive(Clone, Debug)]
pub struct Onboarding<S> {
    backend: Backend,
    cfg: Arc<CoreConfig>,
    controller: StepController<OnboardingStep>,
    draft: PatientDraft,
    state: S,
}

impl Onboarding<Draft> {
    /// Starts a fresh intake session at the first step.
    pub fn new(backend: Backend, cfg: Arc<CoreConfig>) -> Self {
        Self {
            backend,
            cfg,
            controller: StepController::onboarding(),
            draft: PatientDraft::default(),
            state: Draft,
        }
    }

    /// Creates the patient record from the personal and contact steps.
    ///
    /// **This method consumes `self`** and returns `Onboarding<Created>` on
    /// success. On failure the unchanged draft session is handed back
    /// alongside the error, so state remains at the failing step.
    ///
    /// # Errors
    ///
    /// - [`ClinicError::Validation`] when either gating step has not been
    ///   completed.
    /// - [`ClinicError::Unauthenticated`] when no session exists; nothing
    ///   is written.
    /// - [`ClinicError::DuplicateValue`] when the backend reports a unique
    ///   violation (e.g. an already-registered national id).
    pub async fn create(self) -> Result<Onboarding<Created>, (Self, ClinicError)> {
        let (personal, contact) = match (&self.draft.personal, &self.draft.contact) {
            (Some(personal), Some(contact)) => (personal.clone(), contact.clone()),
            _ => {
                let mut errors = FieldErrors::new();
                errors.push(
                    "onboarding",
                    "Complete the personal and contact steps before saving",
                );
                return Err((self, ClinicError::Validation(errors)));
            }
        };

        if let Err(error) = require_session(&self.backend).await {
            return Err((self, error));
        }

        let row = identity_payload(&personal, &contact);
        let stored = match self.backend.database().insert(PATIENTS_TABLE, row).await {
            Ok(stored) => stored,
            Err(error) => return Err((self, error.into())),
        };

        let patient_id = match stored.get("id").and_then(serde_json::Value::as_str) {
            Some(id) => PatientId::new(id),
            None => {
                return Err((
                    self,
                    ClinicError::Backend(BackendError::Transport(
                        "backend returned a created row without an id".to_string(),
                    )),
                ))
            }
        };

        tracing::debug!(%patient_id, "patient record created from partial save");

        let Onboarding {
            backend,
            cfg,
            controller,
            draft,
            state: Draft,
        } = self;

        Ok(Onboarding {
            backend,
            cfg,
            controller,
            draft,
            state: Created { patient_id },
        })
    }
}

impl<S> Onboarding<S> {
    /// The step the user is currently on.
    pub fn step(&self) -> OnboardingStep {
        self.controller.current()
    }

    /// Zero-based index of the current step.
    pub fn step_index(&self) -> usize {
        self.controller.index()
    }

    /// Moves back one step without touching any draft data.
    pub fn back(&mut self) {
        self.controller.back();
    }

    /// Jumps to an arbitrary step, e.g. from the progress bar.
    pub fn go_to_step(&mut self, index: usize) {
        self.controller.go_to(index);
    }

    /// Read access to the draft aggregate.
    pub fn draft(&self) -> &PatientDraft {
        &self.draft
    }

    /// Validates and stores the personal step, then advances.
    pub fn complete_personal(&mut self, input: &PersonalInput) -> Result<(), FieldErrors> {
        self.draft.personal = Some(personal::validate(input)?);
        self.controller.next();
        Ok(())
    }

    /// Validates and stores the contact step, then advances.
    pub fn complete_contact(&mut self, input: &ContactInput) -> Result<(), FieldErrors> {
        self.draft.contact = Some(contact::validate(input)?);
        self.controller.next();
        Ok(())
    }

    /// Validates and stores the medical step, then advances.
    pub fn complete_medical(&mut self, input: &MedicalInput) -> Result<(), FieldErrors> {
        self.draft.medical = Some(medical::validate(input)?);
        self.controller.next();
        Ok(())
    }

    /// Validates and stores the dental step, then advances.
    pub fn complete_dental(&mut self, input: &DentalInput) -> Result<(), FieldErrors> {
        self.draft.dental = Some(dental::validate(input)?);
        self.controller.next();
        Ok(())
    }

    /// Validates and stores the family step, then advances.
    pub fn complete_family(&mut self, input: &FamilyInput) -> Result<(), FieldErrors> {
        self.draft.family = Some(family::validate(input)?);
        self.controller.next();
        Ok(())
    }

    /// Validates and stores the lifestyle step, then advances.
    pub fn complete_lifestyle(&mut self, input: &LifestyleInput) -> Result<(), FieldErrors> {
        self.draft.lifestyle = Some(lifestyle::validate(input)?);
        self.controller.next();
        Ok(())
    }

    /// Validates and stores the consent step, then advances.
    pub fn complete_consent(&mut self, input: &ConsentInput) -> Result<(), FieldErrors> {
        self.draft.consent = Some(consent::validate(input)?);
        self.controller.next();
        Ok(())
    }

    /// Queues a file for upload at submit time.
    ///
    /// Queuing is allowed in any state — the bytes stay client-side. A
    /// queued file of a singleton kind replaces any previously queued file
    /// of that kind, mirroring the attachment policy.
    pub fn queue_document(&mut self, pending: PendingUpload) {
        if pending.kind().is_singleton() {
            self.draft
                .pending_files
                .retain(|existing| existing.kind() != pending.kind());
        }
        self.draft.pending_files.push(pending);
    }

    /// Validates raw file content and queues it for upload.
    ///
    /// # Errors
    ///
    /// [`ClinicError::FileRejected`] naming the file field when the content
    /// is empty, oversized or of an unacceptable media type.
    pub fn queue_file(
        &mut self,
        kind: DocumentKind,
        filename: &str,
        bytes: Vec<u8>,
    ) -> ClinicResult<()> {
        let pending = PendingUpload::new(kind, filename, bytes).map_err(|source| {
            ClinicError::FileRejected {
                field: kind.tag().to_string(),
                source,
            }
        })?;
        self.queue_document(pending);
        Ok(())
    }
}

impl Onboarding<Created> {
    /// The identity assigned by the partial create.
    pub fn patient_id(&self) -> &PatientId {
        &self.state.patient_id
    }

    /// Uploads pending files, applies the attachment policy and issues the
    /// single merged update.
    ///
    /// Call order inside is fixed: session check, then uploads, then the
    /// update. A failed upload aborts before the update, and nothing is
    /// committed locally until the backend accepted the patch — submitting
    /// again after a failure retries the full sequence.
    ///
    /// Submitting twice without intervening edits issues two updates with
    /// identical patch content.
    ///
    /// # Errors
    ///
    /// - [`ClinicError::Validation`] when a gating step (personal,
    ///   contact, consent) is incomplete.
    /// - [`ClinicError::Unauthenticated`] when the session expired; no
    ///   upload is attempted.
    /// - [`ClinicError::UploadFailed`] naming the file field that failed.
    /// - [`ClinicError::DuplicateValue`] for backend unique violations.
    pub async fn submit(&mut self) -> ClinicResult<Patient> {
        let mut missing = FieldErrors::new();
        if self.draft.personal.is_none() {
            missing.push("personal", "Personal step is incomplete");
        }
        if self.draft.contact.is_none() {
            missing.push("contact", "Contact step is incomplete");
        }
        if self.draft.consent.is_none() {
            missing.push("consent", "Consent has not been recorded");
        }
        if !missing.is_empty() {
            return Err(ClinicError::Validation(missing));
        }

        require_session(&self.backend).await?;

        let document_service = DocumentService::new(self.backend.clone(), self.cfg.clone());
        let mut uploaded = Vec::with_capacity(self.draft.pending_files.len());
        for pending in &self.draft.pending_files {
            let document = document_service
                .upload_pending(Some(&self.state.patient_id), pending.kind().tag(), pending)
                .await?;
            uploaded.push(document);
        }

        let mut documents = self.draft.documents.clone();
        for document in uploaded {
            documents = attach(documents, document);
        }

        let patch = merged_payload(&self.draft, &documents);
        let stored = self
            .backend
            .database()
            .update(
                PATIENTS_TABLE,
                patch,
                "id",
                &json!(self.state.patient_id.as_str()),
            )
            .await?;

        // Commit local state only now that the backend accepted everything.
        self.draft.documents = documents;
        self.draft.pending_files.clear();

        tracing::debug!(patient_id = %self.state.patient_id, "onboarding submitted");
        Ok(row_to(PATIENTS_TABLE, stored)?)
    }
}

// ============================================================================
// PAYLOAD CONSTRUCTION
// ============================================================================

/// The partial-create payload: personal and contact fields only.
fn identity_payload(personal: &PersonalData, contact: &ContactData) -> Row {
    json_object(json!({
        "first_name": personal.first_name.as_str(),
        "last_name": personal.last_name.as_str(),
        "date_of_birth": date_string(personal.date_of_birth),
        "gender": personal.gender,
        "national_id": personal.national_id,
        "phone": contact.phone.as_str(),
        "email": contact.email.as_ref().map(|e| e.as_str()),
        "address_line": contact.address_line,
        "city": contact.city,
        "postcode": contact.postcode,
        "emergency_contact_name": contact.emergency_contact.as_ref().map(|c| c.name.as_str()),
        "emergency_contact_phone": contact.emergency_contact.as_ref().map(|c| c.phone.as_str()),
    }))
}

/// The full submit payload: every completed step merged into one patch,
/// with client representations already normalised (absent optionals are
/// `null`, list fields are typed arrays).
fn merged_payload(draft: &PatientDraft, documents: &[Document]) -> Row {
    let mut patch = match (&draft.personal, &draft.contact) {
        (Some(personal), Some(contact)) => identity_payload(personal, contact),
        // Guarded by submit(); an empty patch would never validate there.
        _ => Row::new(),
    };

    if let Some(medical) = &draft.medical {
        patch.extend(json_object(json!({
            "allergies": medical.allergies,
            "conditions": medical.conditions,
            "medications": medical.medications,
            "has_heart_condition": medical.has_heart_condition,
            "has_diabetes": medical.has_diabetes,
            "is_pregnant": medical.is_pregnant,
            "blood_type": medical.blood_type,
        })));
    }

    if let Some(dental) = &draft.dental {
        patch.extend(json_object(json!({
            "last_visit_date": dental.last_visit_date.map(date_string),
            "reason_for_visit": dental.reason_for_visit.as_str(),
            "has_pain": dental.has_pain,
            "pain_description": dental.pain_description,
            "previous_orthodontics": dental.previous_orthodontics,
            "brushing_frequency": dental.brushing_frequency,
        })));
    }

    if let Some(family) = &draft.family {
        patch.extend(json_object(json!({
            "family_conditions": family.family_conditions,
            "family_dental_issues": family.family_dental_issues,
            "family_notes": family.notes,
        })));
    }

    if let Some(lifestyle) = &draft.lifestyle {
        patch.extend(json_object(json!({
            "smoking": lifestyle.smoking,
            "smoking_years": lifestyle.smoking_years,
            "alcohol": lifestyle.alcohol,
            "sugar_intake": lifestyle.sugar_intake,
            "flosses_daily": lifestyle.flosses_daily,
        })));
    }

    if let Some(consent) = &draft.consent {
        patch.extend(json_object(json!({
            "consent_treatment": consent.treatment,
            "consent_data_processing": consent.data_processing,
            "consent_marketing": consent.marketing,
            "consent_appointment_reminders": consent.appointment_reminders,
        })));
    }

    patch.insert(
        "documents".to_string(),
        serde_json::to_value(documents).unwrap_or_default(),
    );
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpm_backend::memory::MutationKind;
    use dpm_backend::MemoryBackend;
    use dpm_files::DocumentKind;

    fn personal_input() -> PersonalInput {
        PersonalInput {
            first_name: "Amira".into(),
            last_name: "Hassan".into(),
            date_of_birth: "1988-04-12".into(),
            gender: "female".into(),
            national_id: "ZA-99-1204".into(),
        }
    }

    fn contact_input() -> ContactInput {
        ContactInput {
            phone: "+44 20 7946 0958".into(),
            email: "amira@example.org".into(),
            ..ContactInput::default()
        }
    }

    fn consent_input() -> ConsentInput {
        ConsentInput {
            treatment: true,
            data_processing: true,
            marketing: false,
            appointment_reminders: true,
        }
    }

    fn png_pending(kind: DocumentKind, filename: &str) -> PendingUpload {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(filename.as_bytes());
        PendingUpload::new(kind, filename, bytes).expect("png accepted")
    }

    fn session(memory: &MemoryBackend) -> Onboarding<Draft> {
        Onboarding::new(memory.handle(), Arc::new(CoreConfig::default()))
    }

    async fn created_session(memory: &MemoryBackend) -> Onboarding<Created> {
        let mut draft = session(memory);
        draft.complete_personal(&personal_input()).expect("personal valid");
        draft.complete_contact(&contact_input()).expect("contact valid");
        draft.create().await.map_err(|(_, e)| e).expect("create succeeds")
    }

    fn complete_remaining_steps(onboarding: &mut Onboarding<Created>) {
        onboarding
            .complete_medical(&MedicalInput::default())
            .expect("medical valid");
        onboarding
            .complete_dental(&DentalInput {
                reason_for_visit: "Routine check-up".into(),
                ..DentalInput::default()
            })
            .expect("dental valid");
        onboarding
            .complete_family(&FamilyInput::default())
            .expect("family valid");
        onboarding
            .complete_lifestyle(&LifestyleInput {
                smoking: "never".into(),
                ..LifestyleInput::default()
            })
            .expect("lifestyle valid");
        onboarding
            .complete_consent(&consent_input())
            .expect("consent valid");
    }

    fn patient_updates(memory: &MemoryBackend) -> Vec<serde_json::Value> {
        memory
            .mutations()
            .into_iter()
            .filter(|m| m.table == PATIENTS_TABLE && m.kind == MutationKind::Update)
            .map(|m| m.payload)
            .collect()
    }

    #[tokio::test]
    async fn completing_steps_advances_the_controller() {
        let memory = MemoryBackend::new();
        let mut draft = session(&memory);
        assert_eq!(draft.step(), OnboardingStep::Personal);

        draft.complete_personal(&personal_input()).expect("personal valid");
        assert_eq!(draft.step(), OnboardingStep::Contact);

        draft.complete_contact(&contact_input()).expect("contact valid");
        assert_eq!(draft.step(), OnboardingStep::Medical);

        draft.back();
        assert_eq!(draft.step(), OnboardingStep::Contact);
    }

    #[tokio::test]
    async fn invalid_step_input_does_not_advance() {
        let memory = MemoryBackend::new();
        let mut draft = session(&memory);

        let errors = draft
            .complete_personal(&PersonalInput::default())
            .expect_err("empty personal input should fail");
        assert!(errors.field("first_name").is_some());
        assert_eq!(draft.step(), OnboardingStep::Personal, "step unchanged");
        assert!(draft.draft().personal.is_none());
    }

    #[tokio::test]
    async fn create_requires_both_gating_steps() {
        let memory = MemoryBackend::new();
        memory.sign_in("reception@clinic.example");
        let mut draft = session(&memory);
        draft.complete_personal(&personal_input()).expect("personal valid");

        let (returned, error) = draft.create().await.expect_err("missing contact step");
        assert!(matches!(error, ClinicError::Validation(_)));
        assert_eq!(returned.step(), OnboardingStep::Contact);
        assert!(memory.mutations().is_empty(), "nothing was written");
    }

    #[tokio::test]
    async fn create_without_session_writes_nothing() {
        let memory = MemoryBackend::new();
        let mut draft = session(&memory);
        draft.complete_personal(&personal_input()).expect("personal valid");
        draft.complete_contact(&contact_input()).expect("contact valid");

        let (_, error) = draft.create().await.expect_err("no session");
        assert!(matches!(error, ClinicError::Unauthenticated));
        assert!(memory.mutations().is_empty());
    }

    #[tokio::test]
    async fn create_persists_only_identity_fields() {
        let memory = MemoryBackend::new();
        memory.sign_in("reception@clinic.example");
        let onboarding = created_session(&memory).await;

        let rows = memory.rows(PATIENTS_TABLE);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.get("first_name"), Some(&json!("Amira")));
        assert_eq!(row.get("phone"), Some(&json!("+442079460958")));
        assert_eq!(row.get("id"), Some(&json!(onboarding.patient_id().as_str())));
        assert!(
            !row.contains_key("consent_treatment"),
            "later-step fields are not part of the partial save"
        );
    }

    #[tokio::test]
    async fn duplicate_national_id_is_translated_to_a_field_message() {
        let memory = MemoryBackend::new();
        memory.add_unique(PATIENTS_TABLE, "national_id");
        memory.sign_in("reception@clinic.example");
        created_session(&memory).await;

        let mut second = session(&memory);
        let mut personal = personal_input();
        personal.first_name = "Another".into();
        second.complete_personal(&personal).expect("personal valid");
        second.complete_contact(&contact_input()).expect("contact valid");

        let (_, error) = second.create().await.expect_err("duplicate national id");
        match error {
            ClinicError::DuplicateValue { field, message } => {
                assert_eq!(field.as_deref(), Some("national_id"));
                assert!(message.contains("national id"));
            }
            other => panic!("expected DuplicateValue, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_merges_all_steps_and_attaches_documents() {
        let memory = MemoryBackend::new();
        memory.sign_in("reception@clinic.example");
        let mut onboarding = created_session(&memory).await;
        complete_remaining_steps(&mut onboarding);
        onboarding.queue_document(png_pending(DocumentKind::ProfilePhoto, "photo.png"));
        onboarding.queue_document(png_pending(DocumentKind::IdDocument, "passport.png"));

        let patient = onboarding.submit().await.expect("submit succeeds");

        assert_eq!(patient.documents.len(), 2);
        assert_eq!(memory.upload_calls().len(), 2);

        let row = &memory.rows(PATIENTS_TABLE)[0];
        assert_eq!(row.get("consent_treatment"), Some(&json!(true)));
        assert_eq!(row.get("smoking"), Some(&json!("never")));
        assert_eq!(row.get("allergies"), Some(&json!([])));
        assert_eq!(row.get("smoking_years"), Some(&json!(null)));
    }

    #[tokio::test]
    async fn submit_without_session_attempts_no_upload() {
        let memory = MemoryBackend::new();
        memory.sign_in("reception@clinic.example");
        let mut onboarding = created_session(&memory).await;
        complete_remaining_steps(&mut onboarding);
        onboarding.queue_document(png_pending(DocumentKind::ProfilePhoto, "photo.png"));

        memory.sign_out();
        let error = onboarding.submit().await.expect_err("session expired");
        assert!(matches!(error, ClinicError::Unauthenticated));
        assert!(memory.upload_calls().is_empty(), "aborted before any upload");
    }

    #[tokio::test]
    async fn failed_upload_aborts_the_save_and_preserves_the_queue() {
        let memory = MemoryBackend::new();
        memory.sign_in("reception@clinic.example");
        memory.fail_uploads_matching(Some("signature"));
        let mut onboarding = created_session(&memory).await;
        complete_remaining_steps(&mut onboarding);
        onboarding.queue_document(png_pending(DocumentKind::ProfilePhoto, "photo.png"));
        onboarding.queue_document(png_pending(DocumentKind::Signature, "sig.png"));

        let error = onboarding.submit().await.expect_err("signature upload fails");
        match error {
            ClinicError::UploadFailed { field, .. } => assert_eq!(field, "signature"),
            other => panic!("expected UploadFailed, got {other:?}"),
        }

        assert!(
            patient_updates(&memory).is_empty(),
            "the merged update must not run after a failed upload"
        );
        assert!(onboarding.draft().documents.is_empty());
        assert_eq!(onboarding.draft().pending_files.len(), 2, "queue preserved");

        // The failure is terminal for this action; an explicit retry after
        // the cause is fixed completes the save.
        memory.fail_uploads_matching(None);
        let patient = onboarding.submit().await.expect("retry succeeds");
        assert_eq!(patient.documents.len(), 2);
    }

    #[tokio::test]
    async fn submitting_twice_produces_identical_patches() {
        let memory = MemoryBackend::new();
        memory.sign_in("reception@clinic.example");
        let mut onboarding = created_session(&memory).await;
        complete_remaining_steps(&mut onboarding);

        onboarding.submit().await.expect("first submit succeeds");
        onboarding.submit().await.expect("second submit succeeds");

        let updates = patient_updates(&memory);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], updates[1], "no hidden accumulation of fields");
    }

    #[tokio::test]
    async fn resubmitting_with_a_new_photo_replaces_the_old_one() {
        let memory = MemoryBackend::new();
        memory.sign_in("reception@clinic.example");
        let mut onboarding = created_session(&memory).await;
        complete_remaining_steps(&mut onboarding);

        onboarding.queue_document(png_pending(DocumentKind::ProfilePhoto, "first.png"));
        onboarding.queue_document(png_pending(DocumentKind::MedicalAttachment, "xray.png"));
        let patient = onboarding.submit().await.expect("first submit succeeds");
        assert_eq!(patient.documents.len(), 2);

        onboarding.queue_document(png_pending(DocumentKind::ProfilePhoto, "second.png"));
        let patient = onboarding.submit().await.expect("second submit succeeds");

        let photos: Vec<_> = patient
            .documents
            .iter()
            .filter(|d| d.kind == DocumentKind::ProfilePhoto)
            .collect();
        assert_eq!(photos.len(), 1, "exactly one profile photo");
        assert!(photos[0].storage_path.ends_with("-second.png"));
        assert!(
            patient
                .documents
                .iter()
                .any(|d| d.kind == DocumentKind::MedicalAttachment),
            "pre-existing attachment unchanged"
        );
    }

    #[tokio::test]
    async fn queue_file_rejects_bad_content_with_the_field_name() {
        let memory = MemoryBackend::new();
        let mut draft = session(&memory);

        let err = draft
            .queue_file(DocumentKind::ProfilePhoto, "notes.txt", b"plain text".to_vec())
            .expect_err("text file rejected as a photo");
        match err {
            ClinicError::FileRejected { field, .. } => assert_eq!(field, "profile_photo"),
            other => panic!("expected FileRejected, got {other:?}"),
        }
        assert!(draft.draft().pending_files.is_empty());
    }

    #[tokio::test]
    async fn queueing_a_singleton_kind_replaces_the_queued_file() {
        let memory = MemoryBackend::new();
        let mut draft = session(&memory);
        draft.queue_document(png_pending(DocumentKind::ProfilePhoto, "first.png"));
        draft.queue_document(png_pending(DocumentKind::ProfilePhoto, "second.png"));
        draft.queue_document(png_pending(DocumentKind::MedicalAttachment, "a.png"));
        draft.queue_document(png_pending(DocumentKind::MedicalAttachment, "b.png"));

        assert_eq!(draft.draft().pending_files.len(), 3);
        let photos = draft
            .draft()
            .pending_files
            .iter()
            .filter(|p| p.kind() == DocumentKind::ProfilePhoto)
            .count();
        assert_eq!(photos, 1);
    }
}
