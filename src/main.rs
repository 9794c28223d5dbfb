use std::sync::Arc;

use anyhow::Context;

use nfse_relay::config::RelayConfig;
use nfse_relay::dispatch::WebhookDispatcher;
use nfse_relay::pipeline::BatchProcessor;
use nfse_relay::pipeline::types::InvoiceDocument;
use nfse_relay::resolve::IbgeResolver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env().context("invalid configuration")?;

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: nfse-relay <file.xml>...");
        eprintln!("  NFSE_WEBHOOK_URL      destination webhook (dispatch skipped when unset)");
        eprintln!("  NFSE_LOOKUP_URL       municipality lookup base URL");
        eprintln!("  NFSE_TAX_VALUE_FIELD  'amount' (ValorIss) or 'rate' (Aliquota)");
        eprintln!("  NFSE_TIMEOUT_SECS     request timeout in seconds");
        std::process::exit(2);
    }

    eprintln!("🧾 nfse-relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Lookup: {}", config.lookup_url);
    eprintln!(
        "   Webhook: {}",
        config.webhook_url.as_deref().unwrap_or("(not set)")
    );
    eprintln!("   Tax value: {:?}\n", config.tax_value_field);

    // Read input documents; an unreadable file is reported but does not
    // stop the rest of the batch.
    let mut documents = Vec::with_capacity(paths.len());
    for path in &paths {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => documents.push(InvoiceDocument {
                file_name: file_name_of(path),
                content,
            }),
            Err(e) => eprintln!("   {} — could not read file: {}", path, e),
        }
    }

    let resolver = Arc::new(IbgeResolver::new(
        config.lookup_url.clone(),
        config.request_timeout,
    ));
    let processor = BatchProcessor::new(resolver, config.tax_value_field);
    let results = processor.process_batch(documents).await;

    for result in &results {
        match &result.error {
            Some(tag) => eprintln!("   {} — {}", result.file_name, tag),
            None => {
                let fields = result.fields.as_ref().expect("successful result has fields");
                eprintln!(
                    "   {} — {} | tomador: {} | valor_iss: {} | deducao: {}",
                    result.file_name,
                    result.municipality_label,
                    fields.payer_name,
                    fields.tax_value,
                    if fields.deduction.is_empty() { "(vazio)" } else { &fields.deduction },
                );
            }
        }
    }

    if let Some(url) = &config.webhook_url {
        let dispatcher = WebhookDispatcher::over_http(config.request_timeout);
        let outcome = dispatcher.dispatch(&results, url).await;
        eprintln!(
            "\n   Dispatched: {} ok, {} with errors",
            outcome.success_count, outcome.error_count
        );
    } else {
        eprintln!("\n   No webhook URL configured; skipping dispatch");
    }

    Ok(())
}

/// File name component of a path, for display and result tagging.
fn file_name_of(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
