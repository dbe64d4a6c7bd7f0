//! Pending uploads and storage-path construction.

use crate::constants::MAX_UPLOAD_BYTES;
use crate::{FilesError, FilesResult};
use chrono::{DateTime, Utc};
use dpm_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Semantic kind of a clinic document.
///
/// The kind drives both the acceptance rules applied before upload and the
/// replacement policy applied after it: a patient carries at most one
/// document each of the profile-photo, signature and ID kinds, while
/// attachments and invoices accumulate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    ProfilePhoto,
    Signature,
    IdDocument,
    MedicalAttachment,
    MaintenanceInvoice,
}

impl DocumentKind {
    /// Wire tag stored in the document's `kind` column.
    pub fn tag(self) -> &'static str {
        match self {
            DocumentKind::ProfilePhoto => "profile_photo",
            DocumentKind::Signature => "signature",
            DocumentKind::IdDocument => "id_document",
            DocumentKind::MedicalAttachment => "medical_attachment",
            DocumentKind::MaintenanceInvoice => "maintenance_invoice",
        }
    }

    /// Parses a wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "profile_photo" => Some(DocumentKind::ProfilePhoto),
            "signature" => Some(DocumentKind::Signature),
            "id_document" => Some(DocumentKind::IdDocument),
            "medical_attachment" => Some(DocumentKind::MedicalAttachment),
            "maintenance_invoice" => Some(DocumentKind::MaintenanceInvoice),
            _ => None,
        }
    }

    /// True when at most one document of this kind may exist per owner, so
    /// a new upload replaces the previous one.
    pub fn is_singleton(self) -> bool {
        matches!(
            self,
            DocumentKind::ProfilePhoto | DocumentKind::Signature | DocumentKind::IdDocument
        )
    }

    /// Whether content of the given media type is acceptable for this kind.
    ///
    /// Photos and signatures must be images. Identity documents,
    /// attachments and invoices are frequently scanned to PDF, so PDF is
    /// accepted there as well.
    fn accepts(self, media_type: &str) -> bool {
        let is_image = media_type.starts_with("image/");
        match self {
            DocumentKind::ProfilePhoto | DocumentKind::Signature => is_image,
            DocumentKind::IdDocument
            | DocumentKind::MedicalAttachment
            | DocumentKind::MaintenanceInvoice => is_image || media_type == "application/pdf",
        }
    }

    fn label(self) -> &'static str {
        match self {
            DocumentKind::ProfilePhoto => "profile photo",
            DocumentKind::Signature => "signature",
            DocumentKind::IdDocument => "ID document",
            DocumentKind::MedicalAttachment => "medical attachment",
            DocumentKind::MaintenanceInvoice => "maintenance invoice",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// An unsaved binary handle, validated and ready to upload.
///
/// Construction performs every client-side check; a `PendingUpload` that
/// exists is uploadable as far as this module can know. The media type is
/// detected from the content's magic bytes, so a renamed `.exe` does not
/// pass as a photo.
#[derive(Clone, Debug)]
pub struct PendingUpload {
    kind: DocumentKind,
    original_filename: NonEmptyText,
    media_type: String,
    bytes: Vec<u8>,
    prepared_at: DateTime<Utc>,
}

impl PendingUpload {
    /// Validates raw file content for upload as the given document kind.
    ///
    /// # Errors
    ///
    /// Returns a [`FilesError`] if the content is empty, exceeds
    /// [`MAX_UPLOAD_BYTES`], has an undetectable or unacceptable media
    /// type, or the filename is blank.
    pub fn new(
        kind: DocumentKind,
        original_filename: impl AsRef<str>,
        bytes: Vec<u8>,
    ) -> FilesResult<Self> {
        if bytes.is_empty() {
            return Err(FilesError::Empty);
        }

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(FilesError::TooLarge {
                size: bytes.len(),
                max: MAX_UPLOAD_BYTES,
            });
        }

        let detected = infer::get(&bytes).map(|t| t.mime_type().to_string());
        let media_type = match detected {
            Some(media_type) if kind.accepts(&media_type) => media_type,
            other => {
                return Err(FilesError::UnsupportedMediaType {
                    kind: kind.label(),
                    detected: other,
                })
            }
        };

        Ok(Self {
            kind,
            original_filename: NonEmptyText::new(original_filename)?,
            media_type,
            bytes,
            prepared_at: Utc::now(),
        })
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn original_filename(&self) -> &str {
        self.original_filename.as_str()
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn prepared_at(&self) -> DateTime<Utc> {
        self.prepared_at
    }

    /// The content bytes, consumed on upload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex SHA-256 digest of the content.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }

    /// Deterministic storage path within the owner's folder:
    /// `<owner_id>/<kind_tag>/<hash_prefix>-<sanitised_filename>`.
    ///
    /// The hash prefix makes re-uploads of identical bytes idempotent at
    /// the storage layer while distinct content never collides on filename.
    pub fn storage_path(&self, owner_id: &str) -> String {
        let hash = self.content_hash();
        format!(
            "{owner_id}/{}/{}-{}",
            self.kind.tag(),
            &hash[..16],
            sanitise_filename(self.original_filename.as_str())
        )
    }
}

/// Replaces filesystem-hostile characters so the storage path stays within
/// one folder regardless of what the browser supplied as a filename.
fn sanitise_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
