//! Personal details: the identity fields collected on the first step.
//!
//! Together with [`contact`](super::contact), this step gates the first
//! partial save — a patient record cannot be created until both validate.

use crate::error::FieldErrors;
use crate::normalise::empty_to_none;
use chrono::{NaiveDate, Utc};
use dpm_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// Raw client input for the personal step.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PersonalInput {
    pub first_name: String,
    pub last_name: String,
    /// ISO date text, `YYYY-MM-DD`.
    pub date_of_birth: String,
    /// One of `female`, `male`, `other`, `prefer_not_to_say`, or empty.
    pub gender: String,
    pub national_id: String,
}

/// Patient gender as offered by the intake form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    Other,
    PreferNotToSay,
}

impl Gender {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "female" => Some(Gender::Female),
            "male" => Some(Gender::Male),
            "other" => Some(Gender::Other),
            "prefer_not_to_say" => Some(Gender::PreferNotToSay),
            _ => None,
        }
    }
}

/// Validated personal details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PersonalData {
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub date_of_birth: NaiveDate,
    pub gender: Option<Gender>,
    pub national_id: Option<String>,
}

/// Validates the personal step.
///
/// # Errors
///
/// Returns [`FieldErrors`] keyed per field: missing names, an absent,
/// malformed or future date of birth, or an unknown gender value.
pub fn validate(input: &PersonalInput) -> Result<PersonalData, FieldErrors> {
    let mut errors = FieldErrors::new();

    let first_name = NonEmptyText::new(&input.first_name)
        .map_err(|_| errors.push("first_name", "First name is required"))
        .ok();
    let last_name = NonEmptyText::new(&input.last_name)
        .map_err(|_| errors.push("last_name", "Last name is required"))
        .ok();

    let date_of_birth = match input.date_of_birth.trim() {
        "" => {
            errors.push("date_of_birth", "Date of birth is required");
            None
        }
        text => match text.parse::<NaiveDate>() {
            Ok(date) if date > Utc::now().date_naive() => {
                errors.push("date_of_birth", "Date of birth cannot be in the future");
                None
            }
            Ok(date) => Some(date),
            Err(_) => {
                errors.push("date_of_birth", "Enter the date of birth as YYYY-MM-DD");
                None
            }
        },
    };

    let gender = match input.gender.trim() {
        "" => None,
        value => match Gender::parse(value) {
            Some(gender) => Some(gender),
            None => {
                errors.push("gender", "Select one of the offered gender options");
                None
            }
        },
    };

    match (first_name, last_name, date_of_birth) {
        (Some(first_name), Some(last_name), Some(date_of_birth)) if errors.is_empty() => {
            Ok(PersonalData {
                first_name,
                last_name,
                date_of_birth,
                gender,
                national_id: empty_to_none(&input.national_id),
            })
        }
        _ => Err(errors),
    }
}
