//! Consent flags.
//!
//! Treatment and data-processing consent are legally required before the
//! record can be completed; marketing and reminder opt-ins are genuinely
//! optional and default to off.

use crate::error::FieldErrors;
use serde::{Deserialize, Serialize};

/// Raw client input for the consent step.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsentInput {
    pub treatment: bool,
    pub data_processing: bool,
    pub marketing: bool,
    pub appointment_reminders: bool,
}

/// Validated consent flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ConsentData {
    pub treatment: bool,
    pub data_processing: bool,
    pub marketing: bool,
    pub appointment_reminders: bool,
}

/// Validates the consent step: the two mandatory consents must be given.
pub fn validate(input: &ConsentInput) -> Result<ConsentData, FieldErrors> {
    let mut errors = FieldErrors::new();

    if !input.treatment {
        errors.push("treatment", "Consent to treatment is required");
    }
    if !input.data_processing {
        errors.push(
            "data_processing",
            "Consent to processing of medical data is required",
        );
    }

    errors.into_result(ConsentData {
        treatment: input.treatment,
        data_processing: input.data_processing,
        marketing: input.marketing,
        appointment_reminders: input.appointment_reminders,
    })
}
