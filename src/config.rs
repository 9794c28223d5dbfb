//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Default IBGE municipality lookup endpoint (v2, by numeric code).
pub const DEFAULT_LOOKUP_URL: &str = "https://servicodados.ibge.gov.br/api/v2/municipios";

/// Which ABRASF element feeds the `valor_iss` payload field.
///
/// Municipal layouts disagree on whether the invoice carries the ISS
/// monetary amount (`ValorIss`) or the rate (`Aliquota`). The mapping is an
/// explicit configuration choice rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxValueField {
    /// Monetary ISS amount (`ValorIss`).
    #[default]
    IssAmount,
    /// ISS rate/percentage (`Aliquota`).
    Aliquota,
}

impl TaxValueField {
    /// Parse from a configuration string (`amount` or `rate`).
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "amount" | "valor_iss" => Ok(Self::IssAmount),
            "rate" | "aliquota" => Ok(Self::Aliquota),
            other => Err(ConfigError::InvalidValue {
                key: "NFSE_TAX_VALUE_FIELD".into(),
                message: format!("expected 'amount' or 'rate', got '{other}'"),
            }),
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Destination webhook URL. When unset, dispatch is skipped.
    pub webhook_url: Option<String>,
    /// Base URL of the municipality lookup service.
    pub lookup_url: String,
    /// Timeout applied to lookup and webhook requests.
    pub request_timeout: Duration,
    /// Which invoice element feeds the tax value field.
    pub tax_value_field: TaxValueField,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            tax_value_field: TaxValueField::default(),
        }
    }
}

impl RelayConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let webhook_url = std::env::var("NFSE_WEBHOOK_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let lookup_url = std::env::var("NFSE_LOOKUP_URL")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string());

        let timeout_secs: u64 = std::env::var("NFSE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let tax_value_field = match std::env::var("NFSE_TAX_VALUE_FIELD") {
            Ok(value) => TaxValueField::parse(&value)?,
            Err(_) => TaxValueField::default(),
        };

        Ok(Self {
            webhook_url,
            lookup_url,
            request_timeout: Duration::from_secs(timeout_secs),
            tax_value_field,
        })
    }
}
