//! Contact details.
//!
//! The phone number is the clinic's primary channel and is required in
//! E.164 form; everything else is optional. The emergency contact is a
//! pair refinement: naming a person without a reachable number is useless
//! in an emergency, so the number becomes required once a name is given.

use crate::error::{FieldError, FieldErrors};
use crate::normalise::empty_to_none;
use dpm_types::{E164Phone, EmailAddress, NonEmptyText};
use serde::{Deserialize, Serialize};

/// Raw client input for the contact step.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactInput {
    pub phone: String,
    pub email: String,
    pub address_line: String,
    pub city: String,
    pub postcode: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
}

/// An emergency contact: always a name with a reachable number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmergencyContact {
    pub name: NonEmptyText,
    pub phone: E164Phone,
}

/// Validated contact details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactData {
    pub phone: E164Phone,
    pub email: Option<EmailAddress>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
}

/// Refinement: an emergency contact name requires a phone number.
pub fn emergency_phone_required_with_name(input: &ContactInput) -> Option<FieldError> {
    if !input.emergency_contact_name.trim().is_empty()
        && input.emergency_contact_phone.trim().is_empty()
    {
        return Some(FieldError::new(
            "emergency_contact_phone",
            "Provide a phone number for the emergency contact",
        ));
    }
    None
}

/// Validates the contact step, then applies refinements.
pub fn validate(input: &ContactInput) -> Result<ContactData, FieldErrors> {
    let mut errors = FieldErrors::new();

    let phone = match E164Phone::parse(&input.phone) {
        Ok(phone) => Some(phone),
        Err(e) => {
            errors.push("phone", e.to_string());
            None
        }
    };

    let email = match input.email.trim() {
        "" => None,
        text => match EmailAddress::parse(text) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push("email", e.to_string());
                None
            }
        },
    };

    let emergency_contact = match (
        empty_to_none(&input.emergency_contact_name),
        empty_to_none(&input.emergency_contact_phone),
    ) {
        (Some(name), Some(phone_text)) => match E164Phone::parse(&phone_text) {
            Ok(contact_phone) => NonEmptyText::new(&name).ok().map(|name| EmergencyContact {
                name,
                phone: contact_phone,
            }),
            Err(e) => {
                errors.push("emergency_contact_phone", e.to_string());
                None
            }
        },
        _ => None,
    };

    for rule in [emergency_phone_required_with_name] {
        if let Some(error) = rule(input) {
            errors.push(error.field, error.message);
        }
    }

    match phone {
        Some(phone) if errors.is_empty() => Ok(ContactData {
            phone,
            email,
            address_line: empty_to_none(&input.address_line),
            city: empty_to_none(&input.city),
            postcode: empty_to_none(&input.postcode),
            emergency_contact,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> ContactInput {
        ContactInput {
            phone: "+44 20 7946 0958".into(),
            email: "amira@example.org".into(),
            address_line: "12 Harley Street".into(),
            city: "London".into(),
            postcode: "W1G 9QD".into(),
            emergency_contact_name: "".into(),
            emergency_contact_phone: "".into(),
        }
    }

    #[test]
    fn accepts_compliant_input_and_normalises_phone() {
        let data = validate(&valid_input()).expect("valid input should pass");
        assert_eq!(data.phone.as_str(), "+442079460958");
        assert_eq!(data.city.as_deref(), Some("London"));
        assert!(data.emergency_contact.is_none());
    }

    #[test]
    fn phone_is_required_and_must_be_e164() {
        let mut input = valid_input();
        input.phone = "020 7946 0958".into();
        let errors = validate(&input).expect_err("national format should fail");
        assert!(errors.field("phone").is_some());
    }

    #[test]
    fn blank_email_is_fine_but_malformed_email_is_not() {
        let mut input = valid_input();
        input.email = "".into();
        assert!(validate(&input).is_ok());

        input.email = "amira-at-example".into();
        let errors = validate(&input).expect_err("malformed email should fail");
        assert!(errors.field("email").is_some());
    }

    #[test]
    fn refinement_requires_phone_when_emergency_name_given() {
        let mut input = valid_input();
        input.emergency_contact_name = "Samir Hassan".into();

        assert!(
            emergency_phone_required_with_name(&input).is_some(),
            "rule should fire on its own"
        );

        let errors = validate(&input).expect_err("missing emergency phone should fail");
        assert_eq!(
            errors.field("emergency_contact_phone"),
            Some("Provide a phone number for the emergency contact")
        );
    }

    #[test]
    fn complete_emergency_contact_is_captured() {
        let mut input = valid_input();
        input.emergency_contact_name = "Samir Hassan".into();
        input.emergency_contact_phone = "+44 7700 900123".into();

        let data = validate(&input).expect("valid input should pass");
        let contact = data.emergency_contact.expect("contact captured");
        assert_eq!(contact.name.as_str(), "Samir Hassan");
        assert_eq!(contact.phone.as_str(), "+447700900123");
    }
}
