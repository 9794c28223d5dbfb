//! Batch processor — extracts fields per document and enriches them with
//! the resolved municipality label.
//!
//! **Core invariant: one `FileResult` per input document, in input order.**
//! A failure on one document never aborts or skips the rest; every failure
//! mode degrades to a per-file error tag.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::TaxValueField;
use crate::extract::extract_fields;
use crate::pipeline::types::{FileResult, InvoiceDocument};
use crate::resolve::{MunicipalityResolver, Resolution};

/// Error tag for documents whose XML could not be read.
pub const ERR_XML_FIELDS: &str = "could not read XML fields";

/// Error tag for documents whose municipality code resolved to nothing.
pub const ERR_MUNICIPALITY: &str = "municipality not found";

/// Batch processor — runs extraction and resolution per document.
///
/// Documents are processed sequentially, item by item: result order is
/// deterministic and the lookup service never sees a parallel burst.
pub struct BatchProcessor {
    resolver: Arc<dyn MunicipalityResolver>,
    tax_field: TaxValueField,
}

impl BatchProcessor {
    /// Create a new batch processor.
    pub fn new(resolver: Arc<dyn MunicipalityResolver>, tax_field: TaxValueField) -> Self {
        Self {
            resolver,
            tax_field,
        }
    }

    /// Process one document. Infallible — failures become error tags.
    pub async fn process(&self, document: InvoiceDocument) -> FileResult {
        let fields = match extract_fields(&document.content, self.tax_field) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(file = %document.file_name, error = %e, "Field extraction failed");
                return FileResult {
                    file_name: document.file_name,
                    fields: None,
                    municipality_label: String::new(),
                    error: Some(ERR_XML_FIELDS.to_string()),
                    processed_at: Utc::now(),
                };
            }
        };

        let resolution = self.resolver.resolve(&fields.municipality_code).await;
        let (municipality_label, error) = match resolution {
            Resolution::Found(label) => (label, None),
            Resolution::NotFound | Resolution::Failed(_) => {
                warn!(
                    file = %document.file_name,
                    code = %fields.municipality_code,
                    "Municipality did not resolve"
                );
                (String::new(), Some(ERR_MUNICIPALITY.to_string()))
            }
        };

        debug!(
            file = %document.file_name,
            code = %fields.municipality_code,
            label = %municipality_label,
            "Document processed"
        );

        FileResult {
            file_name: document.file_name,
            fields: Some(fields),
            municipality_label,
            error,
            processed_at: Utc::now(),
        }
    }

    /// Process a batch of documents sequentially.
    ///
    /// Always yields exactly one result per input, in input order.
    pub async fn process_batch(&self, documents: Vec<InvoiceDocument>) -> Vec<FileResult> {
        let count = documents.len();
        info!(count, "Processing document batch");

        let mut results = Vec::with_capacity(count);
        for document in documents {
            results.push(self.process(document).await);
        }

        let failed = results.iter().filter(|r| r.error.is_some()).count();
        info!(total = count, failed, "Batch processing complete");
        results
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    /// Mock resolver with scripted per-code resolutions.
    struct MockResolver {
        responses: HashMap<String, Resolution>,
    }

    impl MockResolver {
        fn with(responses: &[(&str, Resolution)]) -> Arc<Self> {
            Arc::new(Self {
                responses: responses
                    .iter()
                    .map(|(code, r)| (code.to_string(), r.clone()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl MunicipalityResolver for MockResolver {
        async fn resolve(&self, code: &str) -> Resolution {
            self.responses
                .get(code)
                .cloned()
                .unwrap_or(Resolution::NotFound)
        }
    }

    fn doc(name: &str, xml: &str) -> InvoiceDocument {
        InvoiceDocument {
            file_name: name.into(),
            content: xml.into(),
        }
    }

    const VALID_XML: &str = r#"<Nfse><InfNfse>
        <Servico>
          <Valores><ValorIss>150.00</ValorIss></Valores>
          <CodigoMunicipio>3550308</CodigoMunicipio>
        </Servico>
        <TomadorServico><RazaoSocial>Acme</RazaoSocial></TomadorServico>
    </InfNfse></Nfse>"#;

    fn sp_resolver() -> Arc<MockResolver> {
        MockResolver::with(&[("3550308", Resolution::Found("São Paulo/SP".into()))])
    }

    #[tokio::test]
    async fn valid_document_resolves_label() {
        let processor = BatchProcessor::new(sp_resolver(), TaxValueField::IssAmount);
        let result = processor.process(doc("nota.xml", VALID_XML)).await;

        assert!(result.error.is_none());
        assert_eq!(result.municipality_label, "São Paulo/SP");
        let fields = result.fields.unwrap();
        assert_eq!(fields.tax_value, "150.00");
        assert_eq!(fields.payer_name, "Acme");
    }

    #[tokio::test]
    async fn extraction_failure_tags_result() {
        let processor = BatchProcessor::new(sp_resolver(), TaxValueField::IssAmount);
        let result = processor.process(doc("bad.xml", "<oops>")).await;

        assert!(result.fields.is_none());
        assert_eq!(result.error.as_deref(), Some(ERR_XML_FIELDS));
        assert_eq!(result.municipality_label, "");
    }

    #[tokio::test]
    async fn missing_required_field_tags_result() {
        // No RazaoSocial — extraction fails as a whole
        let xml = r#"<Nfse>
            <CodigoMunicipio>3550308</CodigoMunicipio>
            <ValorIss>1.00</ValorIss>
        </Nfse>"#;
        let processor = BatchProcessor::new(sp_resolver(), TaxValueField::IssAmount);
        let result = processor.process(doc("incomplete.xml", xml)).await;

        assert!(result.fields.is_none());
        assert_eq!(result.error.as_deref(), Some(ERR_XML_FIELDS));
    }

    #[tokio::test]
    async fn unresolved_municipality_keeps_fields_but_tags() {
        let resolver = MockResolver::with(&[("3550308", Resolution::NotFound)]);
        let processor = BatchProcessor::new(resolver, TaxValueField::IssAmount);
        let result = processor.process(doc("nota.xml", VALID_XML)).await;

        assert!(result.fields.is_some());
        assert_eq!(result.municipality_label, "");
        assert_eq!(result.error.as_deref(), Some(ERR_MUNICIPALITY));
    }

    #[tokio::test]
    async fn lookup_failure_treated_like_not_found() {
        let resolver = MockResolver::with(&[("3550308", Resolution::Failed("timeout".into()))]);
        let processor = BatchProcessor::new(resolver, TaxValueField::IssAmount);
        let result = processor.process(doc("nota.xml", VALID_XML)).await;

        assert_eq!(result.municipality_label, "");
        assert_eq!(result.error.as_deref(), Some(ERR_MUNICIPALITY));
    }

    #[tokio::test]
    async fn batch_preserves_length_and_order() {
        let processor = BatchProcessor::new(sp_resolver(), TaxValueField::IssAmount);
        let documents = vec![
            doc("a.xml", VALID_XML),
            doc("b.xml", "not xml"),
            doc("c.xml", VALID_XML),
        ];

        let results = processor.process_batch(documents).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].file_name, "a.xml");
        assert_eq!(results[1].file_name, "b.xml");
        assert_eq!(results[2].file_name, "c.xml");
    }

    #[tokio::test]
    async fn failure_does_not_abort_subsequent_documents() {
        let processor = BatchProcessor::new(sp_resolver(), TaxValueField::IssAmount);
        let documents = vec![doc("bad.xml", "<broken"), doc("good.xml", VALID_XML)];

        let results = processor.process_batch(documents).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].error.as_deref(), Some(ERR_XML_FIELDS));
        assert!(results[1].error.is_none());
        assert_eq!(results[1].municipality_label, "São Paulo/SP");
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_results() {
        let processor = BatchProcessor::new(sp_resolver(), TaxValueField::IssAmount);
        let results = processor.process_batch(vec![]).await;
        assert!(results.is_empty());
    }
}
