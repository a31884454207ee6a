//! # UMKM RAG CLI (`umkm-rag`)
//!
//! ## Usage
//!
//! ```bash
//! umkm-rag --config ./config/umkm.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `umkm-rag serve` | Start the HTTP API server |
//! | `umkm-rag ask "<question>"` | Answer one question and exit |
//! | `umkm-rag insights` | Print the built-in dataset insights |
//! | `umkm-rag search "<question>"` | Show the retrieved documents without calling the chat model |
//! | `umkm-rag documents` | Print the documents built from the dataset (no provider calls) |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use umkm_rag::config::{self, Config};
use umkm_rag::models::AskResponse;
use umkm_rag::rag::RagService;
use umkm_rag::{dataset, logging, server};

/// UMKM RAG — question answering over a UMKM business dataset.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. API keys are read from the environment (or a `.env` file).
#[derive(Parser)]
#[command(
    name = "umkm-rag",
    about = "UMKM RAG — retrieval-augmented question answering over a UMKM dataset",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/umkm.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    ///
    /// The listener comes up immediately; the dataset is indexed in the
    /// background and `/health` reports when it is ready.
    Serve,

    /// Answer a single question from the dataset.
    Ask {
        /// The question to answer.
        question: String,

        /// Print the response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print an analysis of the whole dataset.
    Insights {
        /// Print the response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show which documents a question retrieves, with similarity scores.
    Search {
        /// The question to retrieve documents for.
        question: String,

        /// Override `[retrieval].top_k`.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the documents built from the dataset.
    ///
    /// Makes no provider calls, so it works without API keys.
    Documents {
        /// Print documents as a JSON array.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut cfg = config::load_config(&cli.config)?;
    logging::init_logging(&cfg.logging)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Ask { question, json } => {
            let service = ready_service(&cfg).await?;
            let response = service.ask_question(&question).await?;
            print_response(&response, json)?;
        }
        Commands::Insights { json } => {
            let service = ready_service(&cfg).await?;
            let response = service.generate_insights().await?;
            print_response(&response, json)?;
        }
        Commands::Search { question, limit } => {
            if let Some(limit) = limit {
                cfg.retrieval.top_k = limit.max(1);
            }
            let service = ready_service(&cfg).await?;
            let hits = service.retrieve(&question).await?;
            if hits.is_empty() {
                println!("No results.");
            }
            for (rank, hit) in hits.iter().enumerate() {
                println!(
                    "{}. [{:.4}] {}",
                    rank + 1,
                    hit.score,
                    umkm_rag::sources::format_source(&hit.document)
                );
                for line in hit.document.text.lines() {
                    println!("     {}", line);
                }
            }
        }
        Commands::Documents { json } => {
            let records = dataset::load_records(&cfg.dataset.path)?;
            let documents = dataset::build_documents(&records, &cfg.dataset.source_label);
            if json {
                println!("{}", serde_json::to_string_pretty(&documents)?);
            } else {
                for doc in &documents {
                    println!("── Document {} ──", doc.metadata.index);
                    println!("{}", doc.text);
                }
                println!("{} documents", documents.len());
            }
        }
    }

    Ok(())
}

/// Build providers and index the dataset before returning.
async fn ready_service(cfg: &Config) -> Result<RagService> {
    let service = RagService::from_config(cfg)?;
    service
        .initialize_from_dataset(&cfg.dataset.path, &cfg.dataset.source_label)
        .await?;
    Ok(service)
}

fn print_response(response: &AskResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    println!("{}", response.answer.trim());
    if !response.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &response.sources {
            println!("  - {}", source);
        }
    }
    Ok(())
}
