//! foliate - reconstruct PDF reading order from word bounding boxes
//!
//! Drives the bbox/raw-text/font-XML adapters and the reading-order pipeline
//! against a real PDF, emitting either plain-text paragraphs or a JSON array.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use foliate_core::pipeline;
use foliate_core::{CancellationToken, PipelineParams};
use tracing_subscriber::EnvFilter;

/// Reconstruct reading order from a PDF's word bounding boxes.
#[derive(Parser, Debug)]
#[command(name = "foliate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the PDF file
    pdf: PathBuf,

    /// 1-based page number to process; all pages are processed if omitted
    #[arg(long)]
    page: Option<u32>,

    /// Path to write output to, or stdout if omitted
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Emit a JSON array of paragraph strings instead of plain text
    #[arg(long)]
    json: bool,

    /// Raise the tracing filter to debug
    #[arg(short = 'd', long)]
    debug: bool,
}

fn page_count(pdf: &std::path::Path) -> anyhow::Result<u32> {
    let output = std::process::Command::new("pdfinfo").arg(pdf).output()?;
    let text = String::from_utf8_lossy(&output.stdout);
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("Pages:") {
            if let Ok(n) = rest.trim().parse::<u32>() {
                return Ok(n);
            }
        }
    }
    anyhow::bail!("could not determine page count for {}", pdf.display())
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if !args.pdf.exists() {
        anyhow::bail!("file not found: {}", args.pdf.display());
    }
    let pdf_path = args.pdf.to_string_lossy().into_owned();

    let pages: Vec<u32> = match args.page {
        Some(p) => vec![p],
        None => (1..=page_count(&args.pdf)?).collect(),
    };

    let params = PipelineParams::default();
    let cancel = CancellationToken::new();

    let mut all_paragraphs: Vec<String> = Vec::new();
    for page in pages {
        match pipeline::run_page(&pdf_path, page, &params, &cancel) {
            Ok(paragraphs) => all_paragraphs.extend(paragraphs),
            Err(e) => {
                tracing::error!(page, error = %e, "page failed, skipping");
            }
        }
    }

    let rendered = if args.json {
        serde_json::to_string_pretty(&all_paragraphs)?
    } else {
        all_paragraphs.join("\n")
    };

    match args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => println!("{rendered}"),
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
