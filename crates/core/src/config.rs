//! Core runtime configuration.
//!
//! Configuration is resolved once at startup and passed into services as
//! `Arc<CoreConfig>`; nothing in this crate reads process-wide state during
//! an operation, which keeps behaviour consistent across async tasks and
//! test harnesses.

use crate::error::{ClinicError, ClinicResult};
use dpm_forms::FieldErrors;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_files_bucket: String,
    asset_files_bucket: String,
    maintenance_due_window_days: u32,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        patient_files_bucket: impl Into<String>,
        asset_files_bucket: impl Into<String>,
        maintenance_due_window_days: u32,
    ) -> ClinicResult<Self> {
        let patient_files_bucket = patient_files_bucket.into();
        let asset_files_bucket = asset_files_bucket.into();

        let mut errors = FieldErrors::new();
        if patient_files_bucket.trim().is_empty() {
            errors.push("patient_files_bucket", "bucket name cannot be empty");
        }
        if asset_files_bucket.trim().is_empty() {
            errors.push("asset_files_bucket", "bucket name cannot be empty");
        }
        if maintenance_due_window_days == 0 {
            errors.push(
                "maintenance_due_window_days",
                "due window must cover at least one day",
            );
        }
        if !errors.is_empty() {
            return Err(ClinicError::Validation(errors));
        }

        Ok(Self {
            patient_files_bucket,
            asset_files_bucket,
            maintenance_due_window_days,
        })
    }

    pub fn patient_files_bucket(&self) -> &str {
        &self.patient_files_bucket
    }

    pub fn asset_files_bucket(&self) -> &str {
        &self.asset_files_bucket
    }

    /// Horizon for the "maintenance due soon" report, in days.
    pub fn maintenance_due_window_days(&self) -> u32 {
        self.maintenance_due_window_days
    }
}

impl Default for CoreConfig {
    /// The bucket names and report window used by the hosted deployment.
    fn default() -> Self {
        Self {
            patient_files_bucket: "patient-files".to_string(),
            asset_files_bucket: "asset-files".to_string(),
            maintenance_due_window_days: 90,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_hosted_deployment() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.patient_files_bucket(), "patient-files");
        assert_eq!(cfg.asset_files_bucket(), "asset-files");
        assert_eq!(cfg.maintenance_due_window_days(), 90);
    }

    #[test]
    fn rejects_blank_bucket_names() {
        let err = CoreConfig::new(" ", "asset-files", 90).expect_err("blank bucket rejected");
        assert!(matches!(err, ClinicError::Validation(_)));
    }
}
