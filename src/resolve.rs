//! Municipality code resolution via the IBGE lookup service.
//!
//! Resolution is enrichment, not a hard requirement: every failure mode
//! degrades to a typed soft-fail instead of an error, and the batch
//! processor maps anything that is not `Found` to an empty label.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ResolveError;

/// Typed outcome of a municipality lookup.
///
/// `NotFound` means the service answered but knows no such code;
/// `Failed` means the lookup itself went wrong (status, transport, shape).
/// Downstream both yield an empty label, but callers can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Resolved to a `"<name>/<UF>"` display label.
    Found(String),
    /// The service returned an empty result for this code.
    NotFound,
    /// The lookup errored; the reason is kept for logging.
    Failed(String),
}

impl Resolution {
    /// Display label, or the empty string for any non-`Found` outcome.
    pub fn into_label(self) -> String {
        match self {
            Self::Found(label) => label,
            Self::NotFound | Self::Failed(_) => String::new(),
        }
    }
}

/// Resolves a municipality code to a display label.
///
/// Implementations must never return an error — soft-fail is the contract.
#[async_trait]
pub trait MunicipalityResolver: Send + Sync {
    async fn resolve(&self, code: &str) -> Resolution;
}

// ── IBGE response shape ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Municipio {
    nome: String,
    microrregiao: Microrregiao,
}

#[derive(Debug, Deserialize)]
struct Microrregiao {
    mesorregiao: Mesorregiao,
}

#[derive(Debug, Deserialize)]
struct Mesorregiao {
    #[serde(rename = "UF")]
    uf: Uf,
}

#[derive(Debug, Deserialize)]
struct Uf {
    sigla: String,
}

/// Parse a lookup response body into a `Resolution`.
///
/// The service answers with a JSON array; only the first element is used.
fn parse_lookup_response(body: &str) -> Resolution {
    let municipios: Vec<Municipio> = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            return Resolution::Failed(ResolveError::Shape(e.to_string()).to_string());
        }
    };
    match municipios.into_iter().next() {
        Some(m) => Resolution::Found(format!("{}/{}", m.nome, m.microrregiao.mesorregiao.uf.sigla)),
        None => Resolution::NotFound,
    }
}

// ── HTTP resolver ───────────────────────────────────────────────────

/// Resolver backed by the IBGE municipality API (`GET <base>/<code>`).
pub struct IbgeResolver {
    base_url: String,
    client: reqwest::Client,
}

impl IbgeResolver {
    /// Create a resolver against the given base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl MunicipalityResolver for IbgeResolver {
    async fn resolve(&self, code: &str) -> Resolution {
        let url = format!("{}/{}", self.base_url, code);
        debug!(code, %url, "Looking up municipality");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(code, error = %e, "Municipality lookup transport failure");
                return Resolution::Failed(ResolveError::Transport(e.to_string()).to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(code, status = status.as_u16(), "Municipality lookup returned non-success");
            return Resolution::Failed(ResolveError::Status(status.as_u16()).to_string());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(code, error = %e, "Failed to read municipality lookup body");
                return Resolution::Failed(ResolveError::Transport(e.to_string()).to_string());
            }
        };

        let resolution = parse_lookup_response(&body);
        match &resolution {
            Resolution::Found(label) => debug!(code, label = %label, "Municipality resolved"),
            Resolution::NotFound => warn!(code, "Municipality lookup returned an empty array"),
            Resolution::Failed(reason) => warn!(code, reason = %reason, "Municipality lookup failed"),
        }
        resolution
    }
}
