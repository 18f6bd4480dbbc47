//! CLI binary for transcript-ocr.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig`, builds a `DocumentSource` from filesystem metadata, and
//! prints the detected fields.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::UNIX_EPOCH;
use tracing_subscriber::EnvFilter;
use transcript_ocr::{DocumentSource, Pipeline, PipelineConfig, USER_FACING_MESSAGE};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract fields from a transcript PDF
  transcript-ocr transcript.pdf

  # A photographed transcript works too
  transcript-ocr scan.jpg

  # Structured output for scripting
  transcript-ocr --json transcript.pdf > fields.json

  # Include the full recognised text
  transcript-ocr --text transcript.pdf

  # Sharper binarisation for faint scans
  transcript-ocr --threshold 150 faint-scan.png

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium shared library
  RUST_LOG          Tracing filter, e.g. RUST_LOG=transcript_ocr=debug

SETUP:
  Recognition uses the system Tesseract install with `eng` language data
  (apt: tesseract-ocr / brew: tesseract). PDF input additionally needs a
  pdfium shared library discoverable at runtime.
"#;

/// Extract academic fields from a transcript PDF or image via OCR.
#[derive(Parser, Debug)]
#[command(
    name = "transcript-ocr",
    version,
    about = "Extract academic fields from a transcript PDF or image via OCR",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the transcript (PDF, PNG, or JPEG).
    input: PathBuf,

    /// Rendering zoom factor for PDF pages (0.5–4.0).
    #[arg(long, env = "TRANSCRIPT_OCR_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// Binarisation luminance threshold (0–255).
    #[arg(long, env = "TRANSCRIPT_OCR_THRESHOLD", default_value_t = 180)]
    threshold: u8,

    /// Tesseract language code.
    #[arg(long, env = "TRANSCRIPT_OCR_LANG", default_value = "eng")]
    lang: String,

    /// Pages preprocessed concurrently.
    #[arg(short, long, env = "TRANSCRIPT_OCR_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Per-page recognition timeout in seconds (no timeout when omitted).
    #[arg(long, env = "TRANSCRIPT_OCR_TIMEOUT")]
    timeout: Option<u64>,

    /// Output the full result as JSON instead of a field table.
    #[arg(long, env = "TRANSCRIPT_OCR_JSON")]
    json: bool,

    /// Also print the aggregated recognised text.
    #[arg(long)]
    text: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TRANSCRIPT_OCR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "TRANSCRIPT_OCR_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build the source from filesystem metadata ────────────────────────
    let source = read_source(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let mut builder = PipelineConfig::builder()
        .render_scale(cli.scale)
        .binarize_threshold(cli.threshold)
        .ocr_language(&cli.lang)
        .concurrency(cli.concurrency);
    if let Some(secs) = cli.timeout {
        builder = builder.recognition_timeout_secs(secs);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    let pipeline = Pipeline::with_config(config);
    let output = match pipeline.process(&source).await {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{} {}", red("✗"), USER_FACING_MESSAGE);
            return Err(e).context("Pipeline failed");
        }
    };

    // ── Print results ────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
        return Ok(());
    }

    if output.fields.is_empty() {
        println!("{}", dim("No fields detected."));
    } else {
        for (field, value) in &output.fields {
            let rendered = match value {
                transcript_ocr::FieldValue::Text(s) => s.clone(),
                transcript_ocr::FieldValue::Number(n) => n.to_string(),
            };
            println!("{:<14} {}", bold(field), rendered);
        }
    }

    if cli.text {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "\n{}", dim("── recognised text ──"))?;
        writeln!(stdout, "{}", output.aggregated_text)?;
    }

    if !cli.quiet {
        let s = &output.stats;
        let tick = if output.is_clean() {
            green("✔")
        } else {
            red("⚠")
        };
        eprintln!(
            "{tick}  {}/{} pages  {}% confidence  {}ms{}",
            s.recognized_pages,
            s.total_pages,
            s.mean_confidence,
            s.total_duration_ms,
            if s.cache_hit { "  (cached)" } else { "" },
        );
        for err in &output.page_errors {
            eprintln!("   {} {err}", red("✗"));
        }
    }

    Ok(())
}

/// Build a `DocumentSource` from a file on disk.
fn read_source(path: &PathBuf) -> Result<DocumentSource> {
    let bytes = std::fs::read(path)?;
    let metadata = std::fs::metadata(path)?;
    let last_modified_ms = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mime_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };

    Ok(DocumentSource::new(name, mime_type, last_modified_ms, bytes))
}
