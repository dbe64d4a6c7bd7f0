use dpm_backend::BackendError;
use dpm_files::FilesError;
use dpm_forms::FieldErrors;

/// Error taxonomy for clinic operations.
///
/// The variants map one-to-one onto how the client surfaces failures:
/// validation errors render inline per field, authentication failures get a
/// distinct re-authenticate prompt, duplicate-value and upload failures name
/// the offending field, and everything else becomes a generic alert carrying
/// the raw message as detail.
#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    /// Client-side schema validation failed; never reached the backend.
    #[error("validation failed: {0}")]
    Validation(#[from] FieldErrors),

    /// No valid session at the time of a write. The operation was aborted
    /// before any partial write.
    #[error("not authenticated; please sign in again")]
    Unauthenticated,

    /// The backend reported a duplicate value. `field` is set when the
    /// violated column could be determined from the constraint payload.
    #[error("{message}")]
    DuplicateValue {
        field: Option<String>,
        message: String,
    },

    /// A file was rejected client-side before upload.
    #[error("file rejected for {field}: {source}")]
    FileRejected {
        field: String,
        #[source]
        source: FilesError,
    },

    /// An individual file upload failed; the remaining save was aborted.
    #[error("upload failed for {field}: {source}")]
    UploadFailed {
        field: String,
        #[source]
        source: BackendError,
    },

    /// A file upload was requested before the patient record exists.
    /// No storage call is made in this state.
    #[error("patient record has not been created yet; file uploads are not possible")]
    PatientNotCreated,

    /// Transport or any other backend failure.
    #[error(transparent)]
    Backend(BackendError),
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;

impl From<BackendError> for ClinicError {
    /// Translates backend failures, turning unique violations into
    /// field-specific human-readable messages.
    fn from(error: BackendError) -> Self {
        if error.is_unique_violation() {
            return match error.unique_violation_column() {
                Some(column) => ClinicError::DuplicateValue {
                    field: Some(column.to_string()),
                    message: format!(
                        "A record with this {} already exists",
                        column.replace('_', " ")
                    ),
                },
                None => ClinicError::DuplicateValue {
                    field: None,
                    message: "A unique value may already exist".to_string(),
                },
            };
        }
        ClinicError::Backend(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_with_column_names_the_field() {
        let backend_error = BackendError::UniqueViolation {
            constraint: "assets_serial_number_key".into(),
            column: Some("serial_number".into()),
        };
        match ClinicError::from(backend_error) {
            ClinicError::DuplicateValue { field, message } => {
                assert_eq!(field.as_deref(), Some("serial_number"));
                assert_eq!(message, "A record with this serial number already exists");
            }
            other => panic!("expected DuplicateValue, got {other:?}"),
        }
    }

    #[test]
    fn unique_violation_without_column_gets_generic_message() {
        let backend_error = BackendError::UniqueViolation {
            constraint: "patients_pkey".into(),
            column: None,
        };
        match ClinicError::from(backend_error) {
            ClinicError::DuplicateValue { field, message } => {
                assert_eq!(field, None);
                assert_eq!(message, "A unique value may already exist");
            }
            other => panic!("expected DuplicateValue, got {other:?}"),
        }
    }

    #[test]
    fn transport_errors_pass_through() {
        let backend_error = BackendError::Transport("connection reset".into());
        assert!(matches!(
            ClinicError::from(backend_error),
            ClinicError::Backend(_)
        ));
    }
}
