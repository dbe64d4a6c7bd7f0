//! Validated primitive types shared across the DPM workspace.
//!
//! Every type in this crate is construction-validated: once a value exists,
//! its invariant holds, so downstream code never re-checks. Serde
//! implementations validate on deserialisation as well, keeping wire input
//! under the same guarantees as programmatic construction.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when parsing an email address.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Email address cannot be empty")]
    Empty,
    #[error("Email address must contain exactly one '@' with text either side")]
    MalformedAddress,
    #[error("Email address domain must contain a '.'")]
    MalformedDomain,
}

/// Errors that can occur when parsing a phone number.
#[derive(Debug, thiserror::Error)]
pub enum PhoneError {
    #[error("Phone number cannot be empty")]
    Empty,
    #[error("Phone number must start with '+' followed by a country code (E.164)")]
    MissingPlus,
    #[error("Phone number must contain 8 to 15 digits after '+'")]
    BadLength,
    #[error("Phone number may contain only digits after '+'")]
    NonDigit,
}

/// A string type that guarantees non-empty content.
///
/// Wraps a `String` and ensures it contains at least one non-whitespace
/// character. Input is trimmed of leading and trailing whitespace during
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the
    /// trimmed result is empty, an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A validated email address.
///
/// Validation is deliberately shallow: one `@` with text either side and a
/// dotted domain. Full RFC 5321 validation belongs to the mail provider;
/// this type only rejects values that cannot possibly deliver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses an email address, trimming surrounding whitespace and
    /// lowercasing the domain part.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first failed check.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, EmailError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }

        let mut parts = trimmed.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();

        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(EmailError::MalformedAddress);
        }

        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(EmailError::MalformedDomain);
        }

        Ok(Self(format!("{local}@{}", domain.to_ascii_lowercase())))
    }

    /// Returns the normalised address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for EmailAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EmailAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A phone number in E.164 format: `+` followed by 8–15 digits.
///
/// Separator characters commonly pasted from address books (spaces, dots,
/// dashes, parentheses) are stripped during parsing, so `+44 20 7946 0958`
/// and `+442079460958` produce the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct E164Phone(String);

impl E164Phone {
    /// Parses a phone number into canonical E.164 form.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] describing the first failed check.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PhoneError> {
        let stripped: String = input
            .as_ref()
            .chars()
            .filter(|c| !matches!(c, ' ' | '.' | '-' | '(' | ')'))
            .collect();

        if stripped.is_empty() {
            return Err(PhoneError::Empty);
        }

        let Some(digits) = stripped.strip_prefix('+') else {
            return Err(PhoneError::MissingPlus);
        };

        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }

        if !(8..=15).contains(&digits.len()) {
            return Err(PhoneError::BadLength);
        }

        Ok(Self(format!("+{digits}")))
    }

    /// Returns the canonical `+<digits>` form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for E164Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for E164Phone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for E164Phone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        E164Phone::parse(&s).map_err(serde::de::Error::custom)
    }
}
