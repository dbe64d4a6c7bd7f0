//! Client-representation normalisation.
//!
//! Browser form state arrives looser than the persistence model wants it:
//! optional inputs come through as empty strings, list-valued fields as
//! comma-separated free text, and money as whatever the user typed. These
//! helpers define the single normalisation applied everywhere a value
//! crosses from client shape to persisted shape.

/// Empty or whitespace-only input becomes `None`; anything else is trimmed.
pub fn empty_to_none(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits comma-separated free text into a clean list: entries are trimmed,
/// blanks dropped, and repeats keep only their first occurrence.
pub fn split_list(input: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for entry in input.split(',') {
        let trimmed = entry.trim();
        if trimmed.is_empty() || seen.iter().any(|existing| existing == trimmed) {
            continue;
        }
        seen.push(trimmed.to_string());
    }
    seen
}

/// Parses money text, tolerating currency symbols and thousands separators.
/// Blank or unparseable input defaults to `0.0`.
pub fn parse_money(input: &str) -> f64 {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '£' | '$' | '€' | ','))
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_to_none_trims() {
        assert_eq!(empty_to_none("  "), None);
        assert_eq!(empty_to_none(""), None);
        assert_eq!(empty_to_none(" latex "), Some("latex".to_string()));
    }

    #[test]
    fn split_list_trims_filters_and_keeps_first_occurrence() {
        let list = split_list("penicillin, latex ,, Penicillin, latex, aspirin ");
        assert_eq!(list, vec!["penicillin", "latex", "Penicillin", "aspirin"]);
    }

    #[test]
    fn split_list_of_blank_input_is_empty() {
        assert!(split_list("").is_empty());
        assert!(split_list(" , , ").is_empty());
    }

    #[test]
    fn money_parses_symbols_and_defaults_to_zero() {
        assert_eq!(parse_money("£1,250.50"), 1250.50);
        assert_eq!(parse_money("300"), 300.0);
        assert_eq!(parse_money(""), 0.0);
        assert_eq!(parse_money("n/a"), 0.0);
    }
}
