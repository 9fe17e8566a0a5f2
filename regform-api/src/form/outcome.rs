use input_masks::{validate_phone, validate_postal_code};
use shared_types::{AddressResult, ContactRecord, ExportReceipt, Notice};

use crate::export::ExportError;
use crate::integrations::LookupError;

/// Submit-time validation failure. The message is shown to the user as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in the required fields: Name, Email and Phone")]
    MissingRequiredFields,

    #[error("Invalid phone. Use the format (11) 99999-9999")]
    InvalidPhone,

    #[error("Invalid postal code. Use the format 00000-000")]
    InvalidPostalCode,
}

/// Checks a record before export; the first failing rule wins.
pub fn validate_for_submit(record: &ContactRecord) -> Result<(), ValidationError> {
    if record.name.is_empty() || record.email.is_empty() || record.phone.is_empty() {
        return Err(ValidationError::MissingRequiredFields);
    }

    if !validate_phone(&record.phone) {
        return Err(ValidationError::InvalidPhone);
    }

    if !record.postal_code.is_empty() && !validate_postal_code(&record.postal_code) {
        return Err(ValidationError::InvalidPostalCode);
    }

    Ok(())
}

#[derive(Debug)]
pub enum LookupOutcome {
    Found(AddressResult),
    NotFound,
    Failed(LookupError),
    MissingPostalCode,
    /// Another action is in flight; the trigger was ignored
    Busy,
}

impl LookupOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            LookupOutcome::Found(address) => {
                Notice::success(format!("Address found: {}/{}", address.city, address.state))
            }
            LookupOutcome::NotFound => {
                Notice::warning("Postal code not found. Check that it is correct.")
            }
            LookupOutcome::Failed(_) => {
                Notice::error("Could not look up the postal code. Try again.")
            }
            LookupOutcome::MissingPostalCode => Notice::info("Enter a postal code first"),
            LookupOutcome::Busy => Notice::info("Please wait for the current operation to finish"),
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Exported(ExportReceipt),
    Rejected(ValidationError),
    ExportFailed(ExportError),
    Busy,
}

impl SubmitOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            SubmitOutcome::Exported(_) => {
                Notice::success("Form submitted and document generated successfully!")
            }
            SubmitOutcome::Rejected(error) => Notice::warning(error.to_string()),
            SubmitOutcome::ExportFailed(_) => Notice::error(
                "Could not generate the document. Your data has been kept, please try again.",
            ),
            SubmitOutcome::Busy => Notice::info("Please wait for the current operation to finish"),
        }
    }

    pub fn receipt(&self) -> Option<&ExportReceipt> {
        match self {
            SubmitOutcome::Exported(receipt) => Some(receipt),
            _ => None,
        }
    }
}
