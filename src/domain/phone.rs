//! Phone number normalization for the messaging channel

/// Strip formatting characters and make sure the number carries a country code.
///
/// Spaces, dashes and parentheses are removed. A number that does not start with
/// `+` gets `country_code` prepended. No further validation is done.
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    if digits.starts_with('+') {
        digits
    } else {
        format!("{}{}", country_code, digits)
    }
}
