use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Normalized address returned by a postal-code lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddressResult {
    /// Street line and complement joined with `", "`
    pub street: String,
    pub district: String,
    pub city: String,
    /// Two-letter state code
    pub state: String,
    pub state_name: String,
}

impl AddressResult {
    /// Single-line address: street, district, city and state code, skipping
    /// empty parts.
    pub fn to_address_line(&self) -> String {
        join_non_empty(&[&self.street, &self.district, &self.city, &self.state])
    }
}

/// Joins the non-empty parts with `", "`.
pub fn join_non_empty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}
