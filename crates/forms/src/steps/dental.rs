//! Dental history.

use crate::error::{FieldError, FieldErrors};
use crate::normalise::empty_to_none;
use chrono::{NaiveDate, Utc};
use dpm_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// Raw client input for the dental step.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DentalInput {
    /// ISO date text; blank when this is the patient's first visit.
    pub last_visit_date: String,
    pub reason_for_visit: String,
    pub has_pain: bool,
    pub pain_description: String,
    pub previous_orthodontics: bool,
    /// One of `rarely`, `daily`, `twice_daily`, `after_meals`, or empty.
    pub brushing_frequency: String,
}

/// How often the patient brushes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushingFrequency {
    Rarely,
    Daily,
    TwiceDaily,
    AfterMeals,
}

impl BrushingFrequency {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "rarely" => Some(BrushingFrequency::Rarely),
            "daily" => Some(BrushingFrequency::Daily),
            "twice_daily" => Some(BrushingFrequency::TwiceDaily),
            "after_meals" => Some(BrushingFrequency::AfterMeals),
            _ => None,
        }
    }
}

/// Validated dental history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DentalData {
    pub last_visit_date: Option<NaiveDate>,
    pub reason_for_visit: NonEmptyText,
    pub has_pain: bool,
    pub pain_description: Option<String>,
    pub previous_orthodontics: bool,
    pub brushing_frequency: Option<BrushingFrequency>,
}

/// Refinement: reported pain requires a description.
pub fn pain_description_required_when_pain(input: &DentalInput) -> Option<FieldError> {
    if input.has_pain && input.pain_description.trim().is_empty() {
        return Some(FieldError::new(
            "pain_description",
            "Describe the pain so the clinician can triage",
        ));
    }
    None
}

/// Validates the dental step, then applies refinements.
pub fn validate(input: &DentalInput) -> Result<DentalData, FieldErrors> {
    let mut errors = FieldErrors::new();

    let reason_for_visit = NonEmptyText::new(&input.reason_for_visit)
        .map_err(|_| errors.push("reason_for_visit", "Reason for visit is required"))
        .ok();

    let last_visit_date = match input.last_visit_date.trim() {
        "" => None,
        text => match text.parse::<NaiveDate>() {
            Ok(date) if date > Utc::now().date_naive() => {
                errors.push("last_visit_date", "Last visit cannot be in the future");
                None
            }
            Ok(date) => Some(date),
            Err(_) => {
                errors.push("last_visit_date", "Enter the last visit as YYYY-MM-DD");
                None
            }
        },
    };

    let brushing_frequency = match input.brushing_frequency.trim() {
        "" => None,
        value => match BrushingFrequency::parse(value) {
            Some(frequency) => Some(frequency),
            None => {
                errors.push("brushing_frequency", "Select one of the offered options");
                None
            }
        },
    };

    for rule in [pain_description_required_when_pain] {
        if let Some(error) = rule(input) {
            errors.push(error.field, error.message);
        }
    }

    match reason_for_visit {
        Some(reason_for_visit) if errors.is_empty() => Ok(DentalData {
            last_visit_date,
            reason_for_visit,
            has_pain: input.has_pain,
            pain_description: empty_to_none(&input.pain_description),
            previous_orthodontics: input.previous_orthodontics,
            brushing_frequency,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> DentalInput {
        DentalInput {
            last_visit_date: "2025-11-03".into(),
            reason_for_visit: "Routine check-up".into(),
            has_pain: false,
            pain_description: "".into(),
            previous_orthodontics: true,
            brushing_frequency: "twice_daily".into(),
        }
    }

    #[test]
    fn accepts_compliant_input() {
        let data = validate(&valid_input()).expect("valid input should pass");
        assert_eq!(data.brushing_frequency, Some(BrushingFrequency::TwiceDaily));
        assert_eq!(data.pain_description, None);
    }

    #[test]
    fn pain_without_description_fails_via_named_rule() {
        let mut input = valid_input();
        input.has_pain = true;

        assert!(pain_description_required_when_pain(&input).is_some());

        let errors = validate(&input).expect_err("pain without description should fail");
        assert!(errors.field("pain_description").is_some());

        input.pain_description = "Throbbing lower-left molar".into();
        assert!(pain_description_required_when_pain(&input).is_none());
        let data = validate(&input).expect("described pain should pass");
        assert_eq!(
            data.pain_description.as_deref(),
            Some("Throbbing lower-left molar")
        );
    }

    #[test]
    fn reason_for_visit_is_required() {
        let mut input = valid_input();
        input.reason_for_visit = "  ".into();
        let errors = validate(&input).expect_err("missing reason should fail");
        assert!(errors.field("reason_for_visit").is_some());
    }

    #[test]
    fn blank_last_visit_means_first_appointment() {
        let mut input = valid_input();
        input.last_visit_date = "".into();
        let data = validate(&input).expect("blank last visit is valid");
        assert_eq!(data.last_visit_date, None);
    }
}
