use crate::digits;

/// Area code (2) plus a 9-digit mobile number.
pub const MAX_PHONE_DIGITS: usize = 11;

/// Applies the phone mask to raw keystroke input.
///
/// Non-digits are stripped and the result is truncated to 11 digits before
/// formatting by length:
///
/// - 0-2 digits: digits only
/// - 3-6 digits: `(DD) D...`
/// - 7-10 digits: `(DD) DDDD-D...`
/// - 11 digits: `(DD) DDDDD-DDDD`
pub fn mask_phone(value: &str) -> String {
    let numbers = digits(value, MAX_PHONE_DIGITS);

    match numbers.len() {
        0..=2 => numbers,
        3..=6 => format!("({}) {}", &numbers[..2], &numbers[2..]),
        7..=10 => format!("({}) {}-{}", &numbers[..2], &numbers[2..6], &numbers[6..]),
        _ => format!("({}) {}-{}", &numbers[..2], &numbers[2..7], &numbers[7..]),
    }
}

pub fn unmask_phone(value: &str) -> String {
    digits(value, usize::MAX)
}

/// A phone is valid with 10 (landline) or 11 (mobile) digits, masked or not.
pub fn validate_phone(value: &str) -> bool {
    matches!(unmask_phone(value).len(), 10 | 11)
}

/// Canonical display form for a complete phone number.
///
/// Returns `value` unchanged when it does not hold 10 or 11 digits.
pub fn format_phone(value: &str) -> String {
    let numbers = unmask_phone(value);

    match numbers.len() {
        10 => format!("({}) {}-{}", &numbers[..2], &numbers[2..6], &numbers[6..]),
        11 => format!("({}) {}-{}", &numbers[..2], &numbers[2..7], &numbers[7..]),
        _ => value.to_string(),
    }
}
