//! Document audit server and CLI
//!
//! A binary for document extraction and auditing via CLI or HTTP server.
//!
//! # Usage
//!
//! ## CLI Mode
//! ```bash
//! doc-audit-server extract --file invoice.pdf --output pretty
//! doc-audit-server extract --response analyze-document.json
//! doc-audit-server convert --file expenses.csv
//! doc-audit-server audit --file documents.json
//! ```
//!
//! ## Server Mode
//! ```bash
//! doc-audit-server serve --port 5000 --static-dir frontend/dist
//! ```
//!
//! AWS credentials come from the default provider chain; `OPENAI_API_KEY` and
//! the other settings may also be placed in a `.env` file.

mod cli;
mod config;
mod responses;
mod server;

use clap::{Parser, Subcommand};
use cli::OutputFormat;
use doc_audit::core::config::{AnalysisConfig, CompletionConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "doc-audit-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Document extraction and audit via CLI or HTTP server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single PDF or image via CLI
    Extract {
        /// Local document to send to the analysis service
        #[arg(long, conflicts_with = "response", required_unless_present = "response")]
        file: Option<PathBuf>,

        /// Saved AnalyzeDocument JSON response to reconstruct offline
        #[arg(long, conflicts_with = "file")]
        response: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        output: OutputFormat,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Convert a CSV, Excel or XML file into structured data
    Convert {
        /// Local structured file
        #[arg(long)]
        file: PathBuf,
    },
    /// Audit a saved JSON list of extracted documents
    Audit {
        /// JSON file holding an array of documents
        #[arg(long)]
        file: PathBuf,

        #[command(flatten)]
        completion: CompletionArgs,
    },
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(long, short, default_value = "5000", env = "AUDIT_PORT")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0", env = "AUDIT_HOST")]
        host: String,

        /// Directory of the built frontend
        #[arg(long = "static-dir", default_value = "frontend/dist", env = "AUDIT_STATIC_DIR")]
        static_dir: PathBuf,

        /// Largest accepted request body in bytes
        #[arg(
            long = "max-upload-bytes",
            default_value_t = config::DEFAULT_MAX_UPLOAD_BYTES,
            env = "AUDIT_MAX_UPLOAD_BYTES"
        )]
        max_upload_bytes: usize,

        #[command(flatten)]
        analysis: AnalysisArgs,

        #[command(flatten)]
        completion: CompletionArgs,
    },
}

#[derive(clap::Args)]
struct AnalysisArgs {
    /// AWS region of the Textract endpoint
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Analysis request timeout in seconds
    #[arg(long = "analysis-timeout", default_value = "60", env = "AUDIT_ANALYSIS_TIMEOUT")]
    timeout_secs: u64,
}

impl From<AnalysisArgs> for AnalysisConfig {
    fn from(args: AnalysisArgs) -> Self {
        AnalysisConfig::new()
            .with_region(args.region)
            .with_timeout_secs(args.timeout_secs)
    }
}

#[derive(clap::Args)]
struct CompletionArgs {
    /// API key for the chat-completions endpoint
    #[arg(long = "api-key", env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long = "base-url", default_value = "https://api.openai.com/v1", env = "AUDIT_COMPLETION_URL")]
    base_url: String,

    /// Chat model used for the audit
    #[arg(long, default_value = "gpt-4o", env = "AUDIT_MODEL")]
    model: String,

    /// Completion request timeout in seconds
    #[arg(long = "completion-timeout", default_value = "120", env = "AUDIT_COMPLETION_TIMEOUT")]
    timeout_secs: u64,
}

impl From<CompletionArgs> for CompletionConfig {
    fn from(args: CompletionArgs) -> Self {
        CompletionConfig::new()
            .with_api_key(args.api_key)
            .with_base_url(args.base_url)
            .with_model(args.model)
            .with_timeout_secs(args.timeout_secs)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();
    doc_audit::utils::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            file,
            response,
            output,
            analysis,
        } => {
            if let Some(response) = response {
                info!("Reconstructing saved response: {}", response.display());
                cli::reconstruct_file(&response, output)?;
            } else if let Some(file) = file {
                info!("Processing file: {}", file.display());
                cli::extract_file(&file, &analysis.into(), output).await?;
            }
        }
        Commands::Convert { file } => {
            info!("Converting file: {}", file.display());
            cli::convert_file(&file)?;
        }
        Commands::Audit { file, completion } => {
            info!("Auditing documents from: {}", file.display());
            cli::audit_file(&file, completion.into()).await?;
        }
        Commands::Serve {
            port,
            host,
            static_dir,
            max_upload_bytes,
            analysis,
            completion,
        } => {
            let config = config::ServerConfig {
                analysis: analysis.into(),
                completion: completion.into(),
                host,
                port,
                static_dir,
                max_upload_bytes,
            };

            info!("Starting server on {}:{}", config.host, config.port);
            server::run_server(config).await?;
        }
    }

    Ok(())
}
