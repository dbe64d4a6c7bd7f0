//! Lifestyle factors relevant to oral health.

use crate::error::{FieldError, FieldErrors};
use serde::{Deserialize, Serialize};

/// Raw client input for the lifestyle step.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LifestyleInput {
    /// One of `never`, `former`, `occasional`, `daily`.
    pub smoking: String,
    /// Years smoked; required unless `smoking` is `never`.
    pub smoking_years: String,
    /// One of `none`, `social`, `regular`, or empty.
    pub alcohol: String,
    /// One of `low`, `moderate`, `high`, or empty.
    pub sugar_intake: String,
    pub flosses_daily: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmokingStatus {
    Never,
    Former,
    Occasional,
    Daily,
}

impl SmokingStatus {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "never" => Some(SmokingStatus::Never),
            "former" => Some(SmokingStatus::Former),
            "occasional" => Some(SmokingStatus::Occasional),
            "daily" => Some(SmokingStatus::Daily),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlcoholUse {
    None,
    Social,
    Regular,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SugarIntake {
    Low,
    Moderate,
    High,
}

/// Validated lifestyle factors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LifestyleData {
    pub smoking: SmokingStatus,
    pub smoking_years: Option<u8>,
    pub alcohol: Option<AlcoholUse>,
    pub sugar_intake: Option<SugarIntake>,
    pub flosses_daily: bool,
}

/// Refinement: any smoking history requires the number of years.
pub fn smoking_years_required_for_smokers(input: &LifestyleInput) -> Option<FieldError> {
    let smokes = !matches!(input.smoking.trim(), "" | "never");
    if smokes && input.smoking_years.trim().is_empty() {
        return Some(FieldError::new(
            "smoking_years",
            "State how many years the patient has smoked",
        ));
    }
    None
}

/// Validates the lifestyle step, then applies refinements.
pub fn validate(input: &LifestyleInput) -> Result<LifestyleData, FieldErrors> {
    let mut errors = FieldErrors::new();

    let smoking = match SmokingStatus::parse(input.smoking.trim()) {
        Some(status) => Some(status),
        None => {
            errors.push("smoking", "Select a smoking status");
            None
        }
    };

    let smoking_years = match input.smoking_years.trim() {
        "" => None,
        text => match text.parse::<u8>() {
            Ok(years) if years <= 100 => Some(years),
            _ => {
                errors.push("smoking_years", "Enter a whole number of years up to 100");
                None
            }
        },
    };

    let alcohol = match input.alcohol.trim() {
        "" => None,
        "none" => Some(AlcoholUse::None),
        "social" => Some(AlcoholUse::Social),
        "regular" => Some(AlcoholUse::Regular),
        _ => {
            errors.push("alcohol", "Select one of the offered options");
            None
        }
    };

    let sugar_intake = match input.sugar_intake.trim() {
        "" => None,
        "low" => Some(SugarIntake::Low),
        "moderate" => Some(SugarIntake::Moderate),
        "high" => Some(SugarIntake::High),
        _ => {
            errors.push("sugar_intake", "Select one of the offered options");
            None
        }
    };

    for rule in [smoking_years_required_for_smokers] {
        if let Some(error) = rule(input) {
            errors.push(error.field, error.message);
        }
    }

    match smoking {
        Some(smoking) if errors.is_empty() => Ok(LifestyleData {
            smoking,
            smoking_years,
            alcohol,
            sugar_intake,
            flosses_daily: input.flosses_daily,
        }),
        _ => Err(errors),
    }
}
