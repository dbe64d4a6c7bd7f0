//! Family history. Everything here is optional free text.

use crate::error::FieldErrors;
use crate::normalise::{empty_to_none, split_list};
use serde::{Deserialize, Serialize};

/// Raw client input for the family-history step.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FamilyInput {
    /// Comma-separated free text.
    pub family_conditions: String,
    /// Comma-separated free text.
    pub family_dental_issues: String,
    pub notes: String,
}

/// Validated family history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FamilyData {
    pub family_conditions: Vec<String>,
    pub family_dental_issues: Vec<String>,
    pub notes: Option<String>,
}

/// Validates the family step. Nothing is required; validation only
/// normalises the client representations.
pub fn validate(input: &FamilyInput) -> Result<FamilyData, FieldErrors> {
    Ok(FamilyData {
        family_conditions: split_list(&input.family_conditions),
        family_dental_issues: split_list(&input.family_dental_issues),
        notes: empty_to_none(&input.notes),
    })
}
