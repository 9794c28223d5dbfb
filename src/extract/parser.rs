//! Namespace-agnostic XML walk and field resolution.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::config::TaxValueField;
use crate::error::ParseError;
use crate::extract::queries::{self, FieldQuery};
use crate::pipeline::types::ExtractedFields;

/// Text content of one element, keyed by its root-to-leaf local-name path.
#[derive(Debug)]
struct TextEntry {
    path: Vec<String>,
    text: String,
}

/// Extract the fiscal field set from one ABRASF NFS-e document.
///
/// Evaluates each field's ordered candidate table against a single pass
/// over the document; the first candidate yielding non-empty trimmed text
/// wins. Fails as a whole when the XML is malformed or any required field
/// stays unresolved after all candidates — no partial success.
pub fn extract_fields(
    xml: &str,
    tax_field: TaxValueField,
) -> Result<ExtractedFields, ParseError> {
    let entries = collect_text_entries(xml)?;

    let municipality_code = require(&entries, queries::MUNICIPALITY_CODE, "CodigoMunicipio")?;
    let tax_value = require(&entries, tax_field.candidates(), "ValorIss/Aliquota")?;
    let payer_name = require(&entries, queries::PAYER_NAME, "RazaoSocial")?;
    let deduction = first_match(&entries, queries::DEDUCTION).unwrap_or_default();
    let invoice_number = first_match(&entries, queries::INVOICE_NUMBER).unwrap_or_default();

    Ok(ExtractedFields {
        municipality_code,
        deduction,
        tax_value,
        payer_name,
        invoice_number,
    })
}

/// Walk the document once, recording trimmed text per element path.
///
/// Element names are reduced to their local part, so `ns2:Numero` and
/// `Numero` are the same element. Text split by entities or CDATA sections
/// is accumulated per element before recording.
fn collect_text_entries(xml: &str) -> Result<Vec<TextEntry>, ParseError> {
    let mut reader = Reader::from_str(xml);
    // (local name, accumulated text) per open element
    let mut stack: Vec<(String, String)> = Vec::new();
    let mut entries = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push((name, String::new()));
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| ParseError::Malformed(e.to_string()))?;
                if let Some((_, buf)) = stack.last_mut() {
                    buf.push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some((_, buf)) = stack.last_mut() {
                    buf.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                if let Some((name, buf)) = stack.pop() {
                    let text = buf.trim();
                    if !text.is_empty() {
                        let mut path: Vec<String> =
                            stack.iter().map(|(n, _)| n.clone()).collect();
                        path.push(name);
                        entries.push(TextEntry {
                            path,
                            text: text.to_string(),
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, PIs, empty elements carry no field text
            Ok(_) => {}
            Err(e) => return Err(ParseError::Malformed(e.to_string())),
        }
    }

    Ok(entries)
}

/// Resolve a required field or fail the extraction.
fn require(
    entries: &[TextEntry],
    candidates: &[FieldQuery],
    field: &'static str,
) -> Result<String, ParseError> {
    first_match(entries, candidates).ok_or(ParseError::MissingField { field })
}

/// Evaluate candidates left to right; first non-empty value wins.
fn first_match(entries: &[TextEntry], candidates: &[FieldQuery]) -> Option<String> {
    for candidate in candidates {
        for entry in entries {
            if path_ends_with(&entry.path, candidate) {
                return Some(entry.text.clone());
            }
        }
    }
    None
}

/// Whether the element path ends with the candidate chain, contiguously.
fn path_ends_with(path: &[String], candidate: &[&str]) -> bool {
    if candidate.len() > path.len() {
        return false;
    }
    path[path.len() - candidate.len()..]
        .iter()
        .zip(candidate)
        .all(|(a, b)| a == b)
}
