//! ABRASF NFS-e field extraction.
//!
//! Pure text-in, fields-out: no I/O. The municipal layouts disagree on
//! structure, so each field is resolved through an ordered candidate table
//! (`queries`) evaluated against a namespace-agnostic walk of the document
//! (`parser`).

pub mod parser;
pub mod queries;

pub use parser::extract_fields;
