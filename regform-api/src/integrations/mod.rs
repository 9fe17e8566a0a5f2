pub mod viacep;

use async_trait::async_trait;
use input_masks::{unmask_postal_code, validate_postal_code};
use shared_types::AddressResult;

pub use viacep::{ViaCepAddress, ViaCepClient};

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Lookup request failed: {0}")]
    Transport(String),

    #[error("Lookup service returned HTTP {0}")]
    Status(u16),

    #[error("Lookup response could not be decoded: {0}")]
    Decode(String),
}

/// Remote address-by-postal-code directory.
///
/// `Ok(None)` is the service saying "no such code"; transport faults and
/// non-success statuses are errors. One call is one request, never retried.
#[async_trait]
pub trait AddressDirectory: Send + Sync {
    async fn find(&self, postal_code_digits: &str) -> Result<Option<ViaCepAddress>, LookupError>;
}

/// Looks up a postal code, masked or not.
///
/// Codes that do not hold exactly eight digits are rejected locally with
/// `Ok(None)` and never reach the directory.
pub async fn lookup_address(
    directory: &dyn AddressDirectory,
    postal_code: &str,
) -> Result<Option<AddressResult>, LookupError> {
    let digits = unmask_postal_code(postal_code);

    if !validate_postal_code(&digits) {
        tracing::debug!("Skipping lookup for malformed postal code {:?}", postal_code);
        return Ok(None);
    }

    let found = directory.find(&digits).await?;

    Ok(found.map(ViaCepAddress::into_address))
}
