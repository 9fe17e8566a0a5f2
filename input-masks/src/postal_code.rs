use crate::digits;

pub const POSTAL_CODE_DIGITS: usize = 8;

/// Applies the CEP mask: `DDDDD` up to five digits, `DDDDD-D..` after that,
/// truncated to eight digits.
pub fn mask_postal_code(value: &str) -> String {
    let numbers = digits(value, POSTAL_CODE_DIGITS);

    if numbers.len() <= 5 {
        numbers
    } else {
        format!("{}-{}", &numbers[..5], &numbers[5..])
    }
}

pub fn unmask_postal_code(value: &str) -> String {
    digits(value, usize::MAX)
}

pub fn validate_postal_code(value: &str) -> bool {
    unmask_postal_code(value).len() == POSTAL_CODE_DIGITS
}

/// Canonical `DDDDD-DDD` form, or `value` unchanged when it is not a full CEP.
pub fn format_postal_code(value: &str) -> String {
    let numbers = unmask_postal_code(value);

    if numbers.len() == POSTAL_CODE_DIGITS {
        format!("{}-{}", &numbers[..5], &numbers[5..])
    } else {
        value.to_string()
    }
}
