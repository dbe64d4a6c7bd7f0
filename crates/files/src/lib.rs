//! # DPM Files
//!
//! Pending-upload handling for the clinic module. A file selected by the
//! user is an unsaved binary handle until the owning record exists and the
//! upload succeeds; this crate owns everything that can be decided about
//! such a handle *before* any network call:
//!
//! - media-type detection from content magic bytes (never from the
//!   filename extension)
//! - acceptance rules per document kind (a signature must be an image, an
//!   ID document may also be a PDF)
//! - size limits
//! - deterministic storage-path construction, content-hashed so re-uploads
//!   of identical bytes land on the same object
//!
//! Uploading itself is a backend concern; this crate performs no I/O.

mod constants;
mod uploads;

pub use constants::MAX_UPLOAD_BYTES;
pub use uploads::{DocumentKind, PendingUpload};

/// Errors that can occur while preparing a file for upload.
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// The selected file contained no bytes.
    #[error("File is empty")]
    Empty,

    /// The file exceeds the upload size limit.
    #[error("File is {size} bytes; the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },

    /// The detected media type is not acceptable for the declared kind.
    #[error("Media type {detected:?} is not accepted for {kind}")]
    UnsupportedMediaType {
        kind: &'static str,
        detected: Option<String>,
    },

    /// Text field error from the shared types crate.
    #[error(transparent)]
    Text(#[from] dpm_types::TextError),
}

pub type FilesResult<T> = std::result::Result<T, FilesError>;
