//! Medical history.
//!
//! Allergies and conditions arrive as comma-separated free text and are
//! normalised to clean lists. Medications are structured entries; a row
//! without a name is rejected with an indexed field key so the client can
//! highlight the exact row.

use crate::error::FieldErrors;
use crate::normalise::split_list;
use dpm_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// One medication row as entered.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MedicationInput {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

/// Raw client input for the medical step.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MedicalInput {
    /// Comma-separated free text.
    pub allergies: String,
    /// Comma-separated free text.
    pub conditions: String,
    pub medications: Vec<MedicationInput>,
    pub has_heart_condition: bool,
    pub has_diabetes: bool,
    /// `yes`, `no`, or empty when not applicable / not answered.
    pub is_pregnant: String,
    /// Blood group, e.g. `A+`, `O-`, or empty when unknown.
    pub blood_type: String,
}

/// ABO/Rh blood group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "A+" => Some(BloodType::APositive),
            "A-" => Some(BloodType::ANegative),
            "B+" => Some(BloodType::BPositive),
            "B-" => Some(BloodType::BNegative),
            "AB+" => Some(BloodType::AbPositive),
            "AB-" => Some(BloodType::AbNegative),
            "O+" => Some(BloodType::OPositive),
            "O-" => Some(BloodType::ONegative),
            _ => None,
        }
    }
}

/// A validated medication entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Medication {
    pub name: NonEmptyText,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
}

/// Validated medical history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MedicalData {
    pub allergies: Vec<String>,
    pub conditions: Vec<String>,
    pub medications: Vec<Medication>,
    pub has_heart_condition: bool,
    pub has_diabetes: bool,
    pub is_pregnant: Option<bool>,
    pub blood_type: Option<BloodType>,
}

/// Validates the medical step.
pub fn validate(input: &MedicalInput) -> Result<MedicalData, FieldErrors> {
    let mut errors = FieldErrors::new();

    let mut medications = Vec::with_capacity(input.medications.len());
    for (index, row) in input.medications.iter().enumerate() {
        match NonEmptyText::new(&row.name) {
            Ok(name) => medications.push(Medication {
                name,
                dosage: crate::normalise::empty_to_none(&row.dosage),
                frequency: crate::normalise::empty_to_none(&row.frequency),
            }),
            Err(_) => errors.push(
                format!("medications[{index}].name"),
                "Medication name is required",
            ),
        }
    }

    let is_pregnant = match input.is_pregnant.trim() {
        "" => None,
        "yes" => Some(true),
        "no" => Some(false),
        _ => {
            errors.push("is_pregnant", "Answer yes or no, or leave blank");
            None
        }
    };

    let blood_type = match input.blood_type.trim() {
        "" => None,
        value => match BloodType::parse(value) {
            Some(blood_type) => Some(blood_type),
            None => {
                errors.push("blood_type", "Unknown blood group");
                None
            }
        },
    };

    errors.into_result(MedicalData {
        allergies: split_list(&input.allergies),
        conditions: split_list(&input.conditions),
        medications,
        has_heart_condition: input.has_heart_condition,
        has_diabetes: input.has_diabetes,
        is_pregnant,
        blood_type,
    })
}
