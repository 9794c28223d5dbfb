//! Shared types for the invoice processing pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Input document ──────────────────────────────────────────────────

/// One uploaded NFS-e document, already read into memory.
///
/// The presentation layer (CLI, form, whatever feeds the batch) converts
/// its native file handles into this struct before processing starts.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    /// Original file name, echoed back in the result.
    pub file_name: String,
    /// Raw XML text of the document.
    pub content: String,
}

// ── Extracted fields ────────────────────────────────────────────────

/// Fiscal fields extracted from one ABRASF NFS-e document.
///
/// `municipality_code`, `tax_value` and `payer_name` are guaranteed
/// non-empty (trimmed) when this struct exists — extraction fails as a
/// whole otherwise. `deduction` and `invoice_number` may be empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// IBGE municipality code (`CodigoMunicipio`).
    pub municipality_code: String,
    /// Deduction amount (`ValorDeducoes`), optional in the layouts.
    pub deduction: String,
    /// ISS amount or rate, depending on the configured mapping.
    pub tax_value: String,
    /// Service payer's legal name (`RazaoSocial`).
    pub payer_name: String,
    /// Invoice number (`Numero`), optional in the layouts.
    pub invoice_number: String,
}

// ── Per-file result ─────────────────────────────────────────────────

/// Result of processing one document through the batch pipeline.
///
/// Created once per input document, never mutated afterwards.
/// `error` is set iff extraction failed, or extraction succeeded but the
/// municipality lookup came back empty; `fields` is `None` iff extraction
/// failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// File name of the source document.
    pub file_name: String,
    /// Extracted fields, `None` when extraction failed.
    pub fields: Option<ExtractedFields>,
    /// Resolved `"<name>/<UF>"` label, empty when resolution failed.
    pub municipality_label: String,
    /// Fixed error tag, `None` for a fully successful document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When processing of this document completed.
    pub processed_at: DateTime<Utc>,
}

impl FileResult {
    /// Whether this result is eligible for webhook dispatch.
    pub fn is_dispatchable(&self) -> bool {
        self.error.is_none() && !self.municipality_label.is_empty()
    }
}

// ── Webhook payload ─────────────────────────────────────────────────

/// JSON body POSTed to the webhook endpoint, one per validated record.
///
/// Field names are the wire contract — Portuguese, snake_case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Resolved municipality label, `"<name>/<UF>"`.
    pub municipio: String,
    /// Deduction amount, may be empty.
    pub deducao: String,
    /// Tax value (amount or rate per the configured mapping).
    pub valor_iss: String,
    /// Service payer's name.
    pub tomador: String,
}

impl WebhookPayload {
    /// Build a payload from a dispatch-eligible result.
    ///
    /// Returns `None` when the result carries an error tag, has no fields,
    /// or has an empty municipality label.
    pub fn from_result(result: &FileResult) -> Option<Self> {
        if !result.is_dispatchable() {
            return None;
        }
        let fields = result.fields.as_ref()?;
        Some(Self {
            municipio: result.municipality_label.clone(),
            deducao: fields.deduction.clone(),
            valor_iss: fields.tax_value.clone(),
            tomador: fields.payer_name.clone(),
        })
    }
}

// ── Dispatch outcome ────────────────────────────────────────────────

/// Aggregate accounting for one dispatch sweep.
///
/// Incremented exactly once per processed `FileResult`, so
/// `success_count + error_count` equals the number of results swept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Results accepted by the webhook endpoint (2xx).
    pub success_count: usize,
    /// Results skipped or rejected (error tag, empty label, non-2xx, transport failure).
    pub error_count: usize,
}
