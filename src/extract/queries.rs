//! Candidate location tables for ABRASF field extraction.
//!
//! Each field carries an ordered list of location queries, most specific
//! first. A query is a chain of local element names that must appear
//! contiguously in the document, ending at the element holding the text —
//! the chain itself may sit at any depth, and namespace prefixes are
//! ignored. The first candidate yielding a non-empty value wins.
//!
//! An explicit table instead of nested branching: supporting a new layout
//! variant means appending a query, not rewriting the extractor.

use crate::config::TaxValueField;

/// Candidate chain of local element names, leaf last.
pub type FieldQuery = &'static [&'static str];

/// Municipality code (required).
pub const MUNICIPALITY_CODE: &[FieldQuery] = &[
    &["InfNfse", "Servico", "CodigoMunicipio"],
    &["CodigoMunicipio"],
];

/// Deduction amount (optional).
pub const DEDUCTION: &[FieldQuery] = &[
    &["InfNfse", "Servico", "Valores", "ValorDeducoes"],
    &["ValorDeducoes"],
];

/// ISS monetary amount.
pub const TAX_AMOUNT: &[FieldQuery] = &[
    &["InfNfse", "Servico", "Valores", "ValorIss"],
    &["ValorIss"],
];

/// ISS rate/percentage.
pub const TAX_RATE: &[FieldQuery] = &[
    &["InfNfse", "Servico", "Valores", "Aliquota"],
    &["Aliquota"],
];

/// Service payer's legal name (required).
pub const PAYER_NAME: &[FieldQuery] = &[
    &["InfNfse", "TomadorServico", "RazaoSocial"],
    &["TomadorServico", "RazaoSocial"],
    &["RazaoSocial"],
];

/// Invoice number (optional).
pub const INVOICE_NUMBER: &[FieldQuery] = &[
    &["InfNfse", "Numero"],
    &["Numero"],
];

impl TaxValueField {
    /// Candidate table backing the configured tax-value mapping.
    pub fn candidates(self) -> &'static [FieldQuery] {
        match self {
            Self::IssAmount => TAX_AMOUNT,
            Self::Aliquota => TAX_RATE,
        }
    }
}
