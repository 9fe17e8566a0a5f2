use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// The single record collected by the registration form.
///
/// `phone` and `postal_code` always hold their masked display form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactRecord {
    pub name: String,
    pub email: String,
    /// Photo as a data URI, empty when none was taken.
    pub photo: String,
    pub postal_code: String,
    pub address: String,
    pub phone: String,
}

impl ContactRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_photo(&self) -> bool {
        !self.photo.is_empty()
    }
}

/// Text fields editable through `apply_edit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum FormField {
    Name,
    Email,
    Phone,
    PostalCode,
    Address,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::PostalCode => "postal-code",
            FormField::Address => "address",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum FormState {
    #[default]
    Editing,
    LookingUp,
    Exporting,
}

/// Read-only view of the controller handed to the UI.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormSnapshot {
    pub record: ContactRecord,
    pub state: FormState,
    pub busy: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct UpdateFieldRequest {
    pub value: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct UpdatePhotoRequest {
    pub data_uri: String,
}
