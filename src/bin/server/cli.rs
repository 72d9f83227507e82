//! CLI mode: run one pipeline step against local files.

use clap::ValueEnum;
use doc_audit::analysis::{AnalysisResponse, TextractAnalyzer, extract_document};
use doc_audit::audit::{Auditor, OpenAiClient, parse_documents};
use doc_audit::convert::convert_structured;
use doc_audit::core::config::{AnalysisConfig, CompletionConfig};
use doc_audit::extraction::{ExtractionResult, reconstruct_response};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

type CliResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

/// Send a local PDF or image to the analysis service and print the reconstruction
pub async fn extract_file(path: &Path, config: &AnalysisConfig, output: OutputFormat) -> CliResult {
    let start = Instant::now();

    info!("Loading document from file...");
    let bytes = tokio::fs::read(path).await?;
    info!("Loaded {} bytes in {:.2}ms", bytes.len(), start.elapsed().as_secs_f64() * 1000.0);

    let analyzer = TextractAnalyzer::new(config).await;
    let result = extract_document(&analyzer, bytes).await?;
    info!("Extraction completed in {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

    print_extraction(&result, output)
}

/// Reconstruct a saved `AnalyzeDocument` JSON response without calling the service
pub fn reconstruct_file(path: &Path, output: OutputFormat) -> CliResult {
    let response = AnalysisResponse::from_json(&std::fs::read(path)?)?;
    let result = reconstruct_response(response.blocks.as_deref())?;
    print_extraction(&result, output)
}

/// Convert a CSV, Excel or XML file and print its `structuredData`
pub fn convert_file(path: &Path) -> CliResult {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = std::fs::read(path)?;

    let data = convert_structured(&file_name, &bytes)?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

/// Audit a saved JSON list of documents and print the Markdown summary
pub async fn audit_file(path: &Path, config: CompletionConfig) -> CliResult {
    let body: serde_json::Value = serde_json::from_slice(&tokio::fs::read(path).await?)?;
    let documents = parse_documents(body)?;
    info!("Auditing {} documents...", documents.len());

    let auditor = Auditor::new(Arc::new(OpenAiClient::new(config)?));
    let start = Instant::now();
    let summary = auditor.audit(&documents).await?;
    info!("Audit completed in {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

    println!("{}", summary.summary);
    Ok(())
}

fn print_extraction(result: &ExtractionResult, output: OutputFormat) -> CliResult {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string(result)?),
        OutputFormat::Pretty => {
            println!("\n=== Extraction Results ===");
            print!("{result}");
        }
    }
    Ok(())
}
