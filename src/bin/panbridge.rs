//! CLI binary for panbridge.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`/`ConversionRequest` and prints results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use panbridge::{
    convert, engine, formats, plan, ConversionConfig, ConversionRequest, RefOutcome,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

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
  # Convert markdown to HTML (stdout)
  panbridge notes.md -t html

  # Convert to a file
  panbridge report.md -t docx -o report.docx

  # Inspect a document: detected type, legal outputs, missing references
  panbridge --check thesis.md

  # Supply a referenced file the document depends on
  panbridge doc.md -t pdf --supply img/fig1.png=./figures/fig1.png

  # Convert without fetching remote images
  panbridge doc.md -t html --no-fetch

  # List every supported conversion
  panbridge --list-formats

  # Structured JSON result (report + stats)
  panbridge doc.md -t html --json > result.json

SETUP:
  panbridge drives a pandoc binary found on PATH (or --pandoc-path).
  Install pandoc: https://pandoc.org/installing.html
"#;

/// Convert documents between formats using a local pandoc install.
#[derive(Parser, Debug)]
#[command(
    name = "panbridge",
    version,
    about = "Convert documents between formats using a local pandoc install",
    long_about = "Upload-style document conversion driven by pandoc: the input's media type is \
auto-detected, legal output formats come from a capability table, local file references are \
checked before conversion, and remote images are fetched into the conversion's working \
directory so the output can embed them.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input document path.
    input: Option<PathBuf>,

    /// Target output format (see --list-formats).
    #[arg(short = 't', long, env = "PANBRIDGE_TO")]
    to: Option<String>,

    /// Write the converted document here instead of stdout.
    #[arg(short, long, env = "PANBRIDGE_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the plan only: detected type, legal outputs, missing references.
    #[arg(long)]
    check: bool,

    /// List supported input formats and their conversions, then exit.
    #[arg(long)]
    list_formats: bool,

    /// Supply a referenced local file as `reference=path` (repeatable).
    #[arg(long = "supply", value_name = "REF=PATH")]
    supply: Vec<String>,

    /// Do not fetch remote images; leave their references unchanged.
    #[arg(long, env = "PANBRIDGE_NO_FETCH")]
    no_fetch: bool,

    /// Also render an inline HTML preview to stderr-adjacent file `preview.html`.
    #[arg(long)]
    preview: bool,

    /// Per-fetch timeout in seconds for remote images.
    #[arg(long, env = "PANBRIDGE_FETCH_TIMEOUT", default_value_t = 10)]
    fetch_timeout: u64,

    /// Concurrent remote fetches.
    #[arg(long, env = "PANBRIDGE_FETCH_CONCURRENCY", default_value_t = 4)]
    fetch_concurrency: usize,

    /// Path to the pandoc binary.
    #[arg(long, env = "PANBRIDGE_PANDOC_PATH", default_value = "pandoc")]
    pandoc_path: String,

    /// Extra arguments passed through to pandoc (repeatable).
    #[arg(long = "pandoc-arg", value_name = "ARG")]
    pandoc_args: Vec<String>,

    /// Output a structured JSON result instead of the converted bytes.
    #[arg(long, env = "PANBRIDGE_JSON")]
    json: bool,

    /// Disable the fetch progress display.
    #[arg(long, env = "PANBRIDGE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PANBRIDGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PANBRIDGE_QUIET")]
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

    // ── List formats ─────────────────────────────────────────────────────
    if cli.list_formats {
        print_format_table();
        return Ok(());
    }

    let Some(ref input) = cli.input else {
        bail!("missing input document (or use --list-formats)");
    };
    let document_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .context("input path has no filename")?
        .to_string();
    let bytes = std::fs::read(input)
        .with_context(|| format!("failed to read '{}'", input.display()))?;

    let config = build_config(&cli)?;

    // ── Check mode: plan only ────────────────────────────────────────────
    if cli.check {
        let p = plan(&document_name, &bytes, &config).context("plan failed")?;
        println!("File:            {}", input.display());
        println!("Detected type:   {}", p.media_type);
        println!("Pandoc format:   {}", p.canonical_format);
        println!("Output formats:  {}", p.output_formats.join(", "));
        if p.local_references.is_empty() {
            println!("References:      none");
        } else {
            println!("References (must be supplied with --supply):");
            for r in &p.local_references {
                println!("  - {r}");
            }
        }
        return Ok(());
    }

    // ── Convert mode ─────────────────────────────────────────────────────
    if !engine::pandoc_available(&config.pandoc_binary).await {
        bail!(
            "pandoc binary '{}' not found — install pandoc (https://pandoc.org/installing.html) \
             or point --pandoc-path at it",
            config.pandoc_binary
        );
    }

    let Some(ref to) = cli.to else {
        bail!("missing output format: pass -t/--to (see --list-formats)");
    };

    let mut request = ConversionRequest::new(document_name, bytes, to.clone());
    for pair in &cli.supply {
        let (reference, path) = pair
            .split_once('=')
            .with_context(|| format!("--supply expects REF=PATH, got '{pair}'"))?;
        let ref_bytes = std::fs::read(path)
            .with_context(|| format!("failed to read supplied file '{path}'"))?;
        request = request.supply(reference, ref_bytes);
    }

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let bar = show_progress.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Converting");
        bar.set_message(cli.input.as_ref().map(|p| p.display().to_string()).unwrap_or_default());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = convert(&request, &config).await;
    if let Some(ref bar) = bar {
        bar.finish_and_clear();
    }
    let output = result.context("conversion failed")?;

    // ── Report ───────────────────────────────────────────────────────────
    if !cli.quiet && !cli.json {
        for outcome in &output.report.outcomes {
            match outcome {
                RefOutcome::Fetched {
                    url,
                    file_name,
                    bytes,
                } => eprintln!(
                    "  {} {url} {} {file_name} {}",
                    green("✓"),
                    dim("→"),
                    dim(&format!("({bytes} bytes)"))
                ),
                RefOutcome::Failed { url, error } => {
                    eprintln!("  {} {url}  {}", red("✗"), red(&error.to_string()))
                }
            }
        }
    }

    // ── Deliver ──────────────────────────────────────────────────────────
    if cli.json {
        // Converted bytes go to --output (or a sibling file); JSON carries
        // the report and stats.
        let dest = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&output.file_name));
        std::fs::write(&dest, &output.bytes)
            .with_context(|| format!("failed to write '{}'", dest.display()))?;
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("failed to serialise result")?
        );
        return Ok(());
    }

    if let Some(ref dest) = cli.output {
        std::fs::write(dest, &output.bytes)
            .with_context(|| format!("failed to write '{}'", dest.display()))?;
        if !cli.quiet {
            eprintln!(
                "{}  {}  {}ms  →  {}",
                green("✔"),
                bold(&output.file_name),
                output.stats.total_duration_ms,
                bold(&dest.display().to_string()),
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(&output.bytes)
            .context("failed to write to stdout")?;
    }

    if let Some(ref html) = output.preview_html {
        let preview_dest = PathBuf::from("preview.html");
        std::fs::write(&preview_dest, html)
            .with_context(|| format!("failed to write '{}'", preview_dest.display()))?;
        if !cli.quiet {
            eprintln!("   preview written to {}", preview_dest.display());
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    ConversionConfig::builder()
        .pandoc_binary(cli.pandoc_path.clone())
        .fetch_timeout_secs(cli.fetch_timeout)
        .fetch_concurrency(cli.fetch_concurrency)
        .materialize_remote(!cli.no_fetch)
        .render_preview(cli.preview)
        .extra_pandoc_args(cli.pandoc_args.clone())
        .build()
        .context("invalid configuration")
}

/// Render the supported-conversions table, grouped by category.
fn print_format_table() {
    println!("{}", bold("Supported Format Conversions"));
    for (category, media_types) in formats::categories() {
        println!("\n{}", bold(category));
        println!("  {:<60} {}", "Input (media type)", "Output formats");
        for mt in *media_types {
            if let Some(entry) = formats::lookup(mt) {
                println!(
                    "  {:<60} {}",
                    format!("{mt} ({})", entry.extension.trim_start_matches('.')),
                    entry.output_formats.join(", ")
                );
            }
        }
    }
}
