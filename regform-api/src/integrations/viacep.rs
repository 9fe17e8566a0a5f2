use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{join_non_empty, AddressResult};

use super::{AddressDirectory, LookupError};

/// Raw ViaCEP payload. Every field may be missing, so all default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViaCepAddress {
    pub cep: String,
    pub logradouro: String,
    pub complemento: String,
    pub bairro: String,
    pub localidade: String,
    pub uf: String,
    pub estado: String,
    pub ibge: String,
    pub ddd: String,
    /// `true` (or `"true"` on newer API versions) for unknown codes
    pub erro: Option<serde_json::Value>,
}

impl ViaCepAddress {
    pub fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn into_address(self) -> AddressResult {
        AddressResult {
            street: join_non_empty(&[&self.logradouro, &self.complemento]),
            district: self.bairro,
            city: self.localidade,
            state: self.uf,
            state_name: self.estado,
        }
    }
}

pub struct ViaCepClient {
    client: reqwest::Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, postal_code_digits: &str) -> String {
        format!("{}/{}/json/", self.base_url, postal_code_digits)
    }
}

#[async_trait]
impl AddressDirectory for ViaCepClient {
    async fn find(&self, postal_code_digits: &str) -> Result<Option<ViaCepAddress>, LookupError> {
        let url = self.url_for(postal_code_digits);
        tracing::debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let address: ViaCepAddress = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        if address.is_not_found() {
            tracing::info!("Postal code {} not found", postal_code_digits);
            return Ok(None);
        }

        Ok(Some(address))
    }
}
