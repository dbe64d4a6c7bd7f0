//! Patient documents: upload gating and the attachment policy.
//!
//! Two rules live here and nowhere else:
//!
//! 1. **Uploads require identity.** A file cannot be uploaded until the
//!    patient record exists, because the storage path is keyed by the
//!    patient id. The guard is a hard precondition — the storage interface
//!    is not called at all while the draft has no id.
//! 2. **Replace by kind.** Uploading a new document of a singleton kind
//!    (profile photo, signature, ID document) replaces the existing one;
//!    other kinds accumulate. The replacement is filter-then-append and is
//!    only applied after the upload and URL retrieval both succeeded, so a
//!    failed upload never leaves the collection half-updated.

use crate::auth::require_session;
use crate::config::CoreConfig;
use crate::error::{ClinicError, ClinicResult};
use crate::patients::PatientId;
use chrono::{DateTime, Utc};
use dpm_backend::Backend;
use dpm_files::{DocumentKind, PendingUpload};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A stored document descriptor, kept in the patient's document collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub kind: DocumentKind,
    pub storage_path: String,
    pub public_url: String,
    pub original_filename: String,
    pub media_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Applies the attachment policy: filter out any existing document of the
/// same singleton kind, then append the new one.
pub fn attach(mut documents: Vec<Document>, new_document: Document) -> Vec<Document> {
    if new_document.kind.is_singleton() {
        documents.retain(|existing| existing.kind != new_document.kind);
    }
    documents.push(new_document);
    documents
}

/// Uploads pending files into the patient-files bucket.
#[derive(Clone, Debug)]
pub struct DocumentService {
    backend: Backend,
    cfg: Arc<CoreConfig>,
}

impl DocumentService {
    pub fn new(backend: Backend, cfg: Arc<CoreConfig>) -> Self {
        Self { backend, cfg }
    }

    /// Uploads one pending file for the given patient and returns its
    /// stored descriptor.
    ///
    /// `field` is the client-side field name (e.g. `profile_photo`) used in
    /// failure messages.
    ///
    /// # Errors
    ///
    /// - [`ClinicError::PatientNotCreated`] when `patient_id` is `None`;
    ///   the storage interface is not called in this case.
    /// - [`ClinicError::Unauthenticated`] when no session exists.
    /// - [`ClinicError::UploadFailed`] naming `field` when the storage
    ///   upload fails.
    pub async fn upload_pending(
        &self,
        patient_id: Option<&PatientId>,
        field: &str,
        pending: &PendingUpload,
    ) -> ClinicResult<Document> {
        let Some(patient_id) = patient_id else {
            return Err(ClinicError::PatientNotCreated);
        };

        require_session(&self.backend).await?;

        let bucket = self.cfg.patient_files_bucket();
        let path = pending.storage_path(patient_id.as_str());

        self.backend
            .storage()
            .upload(bucket, &path, pending.bytes().to_vec())
            .await
            .map_err(|source| ClinicError::UploadFailed {
                field: field.to_string(),
                source,
            })?;

        let public_url = self.backend.storage().public_url(bucket, &path);
        tracing::debug!(%patient_id, kind = %pending.kind(), "document uploaded");

        Ok(Document {
            kind: pending.kind(),
            storage_path: path,
            public_url,
            original_filename: pending.original_filename().to_string(),
            media_type: pending.media_type().to_string(),
            uploaded_at: Utc::now(),
        })
    }
}
