//! Input Masks Crate
//!
//! Pure masking, validation and formatting helpers for the registration form
//! fields. Every function is total: invalid input yields a best-effort string
//! and validity is always a separate boolean query.
//!
//! # Available Masks
//!
//! - Brazilian phone numbers: `(DD) DDDD-DDDD` (landline) and `(DD) DDDDD-DDDD` (mobile)
//! - Brazilian postal codes (CEP): `DDDDD-DDD`
//!
//! # Example
//!
//! ```rust
//! use input_masks::{mask_phone, validate_phone};
//!
//! let masked = mask_phone("11999998888");
//! assert_eq!(masked, "(11) 99999-8888");
//! assert!(validate_phone(&masked));
//! ```

pub mod phone;
pub mod postal_code;

pub use phone::{format_phone, mask_phone, unmask_phone, validate_phone};
pub use postal_code::{
    format_postal_code, mask_postal_code, unmask_postal_code, validate_postal_code,
};

/// Keeps only the ASCII digits of `value`, truncated to at most `limit` digits.
pub(crate) fn digits(value: &str, limit: usize) -> String {
    value
        .chars()
        .filter(char::is_ascii_digit)
        .take(limit)
        .collect()
}
