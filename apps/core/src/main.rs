// Overthinkr V1 Backend Entry Point
// Decodes the hidden emotional meaning in short text messages

mod actors;
mod config;
mod error;
mod logging;
mod models;
mod ocr;
mod parse;
mod preflight;
mod prompt;

#[cfg(test)]
mod tests;

use anyhow::bail;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::error;

use actors::session::SessionHandle;
use config::CoreConfig;
use models::AnalysisRecord;
use ocr::{TesseractExtractor, TextExtractor};

#[derive(Parser)]
#[command(
    name = "overthinkr",
    version,
    about = "Tone analysis for short, ambiguous text messages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one message, typed or extracted from a screenshot
    Analyze {
        /// The message text to analyze
        #[arg(long, conflicts_with = "image")]
        text: Option<String>,
        /// Path to a screenshot to run through OCR first
        #[arg(long)]
        image: Option<PathBuf>,
        /// Print the analysis record as JSON instead of the readable view
        #[arg(long)]
        json: bool,
    },
    /// Check the environment: proxy reachability and OCR availability
    Preflight,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logging::init("overthinkr-core");

    let cli = Cli::parse();
    let config = CoreConfig::from_env()?;

    match cli.command {
        Commands::Analyze { text, image, json } => run_analyze(&config, text, image, json).await,
        Commands::Preflight => run_preflight(&config).await,
    }
}

async fn run_analyze(
    config: &CoreConfig,
    text: Option<String>,
    image: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let message = match (text, image) {
        (Some(text), None) => text,
        (None, Some(path)) => {
            let extractor = TesseractExtractor::new(&config.ocr_language);
            match extractor.extract_text(&path).await {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, "Screenshot extraction failed");
                    bail!("{}", e.user_message());
                }
            }
        }
        _ => bail!("provide exactly one of --text or --image"),
    };

    let message = message.trim().to_string();
    if message.is_empty() {
        bail!("nothing to analyze: the message is empty");
    }

    let session = SessionHandle::new(config);
    match session.submit(message).await {
        Ok(record) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                render_record(&record);
            }
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Analysis failed");
            bail!("{}", e.user_message());
        }
    }
}

async fn run_preflight(config: &CoreConfig) -> anyhow::Result<()> {
    let report = preflight::run_preflight_checks(config).await;

    println!("Preflight: {}", report.summary);
    for check in &report.checks {
        let mark = if check.passed { "ok" } else { "!!" };
        println!("  [{}] {}: {}", mark, check.name, check.message);
    }

    if !report.ready {
        bail!("environment is not ready");
    }
    Ok(())
}

/// The thin rendering consumer: everything visual stays out of the pipeline.
fn render_record(record: &AnalysisRecord) {
    let result = &record.result;
    println!();
    println!("Tone:       {}", result.tone);
    println!("Tension:    {}/10", result.score);
    println!("Confidence: {}%", result.confidence);
    println!();
    println!("{}", result.explanation);
    println!();
    println!("Suggested replies:");
    for reply in &result.replies {
        println!(
            "  [{}] {}: {}",
            reply.hint().icon_name(),
            reply.tone.label(),
            reply.message
        );
    }
}
