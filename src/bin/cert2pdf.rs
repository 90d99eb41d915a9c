//! CLI binary for cert2pdf.
//!
//! A thin shim over the library crate: with no name input it starts the
//! interactive session; with `--names`/`--input` it maps CLI flags to an
//! `ExportConfig` and drives a one-shot batch export.

use anyhow::{Context, Result};
use cert2pdf::{
    parse_names, render, AlwaysConfirm, CertError, CertificateBatch, ConfirmPrompt, ExportConfig,
    ExportDriver, ExportPolicy, ExportProgressCallback, ProgressCallback, RenderMode, Session,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal confirmation prompt ─────────────────────────────────────────────

/// Asks on stderr, reads a y/n answer from stdin. Anything that is not an
/// explicit yes counts as no.
struct TerminalPrompt;

impl ConfirmPrompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        eprint!("{} {} [y/N] ", cyan("?"), message);
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "sim")
    }
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-item log
/// lines using [indicatif]. Works correctly when items complete out of
/// order (staggered policy).
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Per-item wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} certificates  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Exporting");

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn elapsed_ms(&self, index: usize) -> u128 {
        self.start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0)
    }
}

impl ExportProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Exporting {total} certificate(s)…"))
        ));
    }

    fn on_item_start(&self, index: usize, _total: usize, name: &str) {
        self.start_times
            .lock()
            .unwrap()
            .insert(index, Instant::now());
        self.bar.set_message(name.to_string());
    }

    fn on_item_complete(&self, index: usize, total: usize, file_name: &str) {
        let elapsed_ms = self.elapsed_ms(index);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index + 1,
            total,
            file_name,
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, total: usize, error: String) {
        let elapsed_ms = self.elapsed_ms(index);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, exported: usize) {
        let failed = total.saturating_sub(exported);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} certificate(s) exported successfully",
                green("✔"),
                bold(&exported.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} certificate(s) exported  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&exported.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive session (seeded with example names)
  cert2pdf

  # One-shot: names inline, PDFs into ./certificates
  cert2pdf --names "João Silva, Maria Santos" -o certificates

  # One-shot: names from a file, one per line
  cert2pdf --input attendees.txt -o certificates

  # Names from stdin, skip the large-batch confirmation
  cat attendees.txt | cert2pdf --input - --yes -o certificates

  # Staggered submissions 250 ms apart
  cert2pdf --input attendees.txt --policy staggered --delay 250

  # Machine-readable outcome report
  cert2pdf --input attendees.txt --json > report.json

  # Just look at the certificate text for the first name
  cert2pdf --names "Maria Santos" --preview

OUTPUT:
  One PDF per name: certificado_<name with whitespace as underscores>.pdf
  A4 landscape, zero margins, 1123×794 px print canvas.

EXPORT PACING:
  sequential  await each certificate, pause --delay ms between items;
              completions in batch order, failures visible immediately (default)
  staggered   submit all items concurrently, item i delayed by i×--delay ms;
              initiations ordered, completions may interleave
"#;

/// Batch-generate completion-certificate PDFs from a list of names.
#[derive(Parser, Debug)]
#[command(
    name = "cert2pdf",
    version,
    about = "Batch-generate completion-certificate PDFs from a list of names",
    long_about = "Generate printable completion certificates (A4 landscape PDF) from a \
free-form list of names. Run with no arguments for an interactive session, or pass \
--names/--input for scripted batch export.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Names inline, separated by newlines/commas/semicolons/colons.
    #[arg(long, conflicts_with = "input")]
    names: Option<String>,

    /// Read names from this file ('-' for stdin).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory to write PDFs into.
    #[arg(short, long, env = "CERT2PDF_OUT", default_value = ".")]
    out: PathBuf,

    /// Batch pacing policy.
    #[arg(long, env = "CERT2PDF_POLICY", value_enum, default_value = "sequential")]
    policy: PolicyArg,

    /// Pause between batch items in milliseconds.
    #[arg(long, env = "CERT2PDF_DELAY", default_value_t = 1000)]
    delay: u64,

    /// Ask for confirmation above this many certificates.
    #[arg(long, env = "CERT2PDF_THRESHOLD", default_value_t = 5)]
    threshold: usize,

    /// Image encoding quality hint (0.0–1.0).
    #[arg(long, env = "CERT2PDF_QUALITY", default_value_t = 0.98)]
    quality: f32,

    /// Raster scale multiplier for print fidelity (≥ 1).
    #[arg(long, env = "CERT2PDF_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// Answer yes to every confirmation (large batches).
    #[arg(short = 'y', long)]
    yes: bool,

    /// Print the text preview of each parsed name and exit without exporting.
    #[arg(long)]
    preview: bool,

    /// Output the export report as JSON instead of a summary.
    #[arg(long, env = "CERT2PDF_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "CERT2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CERT2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CERT2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PolicyArg {
    Sequential,
    Staggered,
}

impl From<PolicyArg> for ExportPolicy {
    fn from(v: PolicyArg) -> Self {
        match v {
            PolicyArg::Sequential => ExportPolicy::Sequential,
            PolicyArg::Staggered => ExportPolicy::Staggered,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let one_shot = cli.names.is_some() || cli.input.is_some();
    let show_progress = one_shot && !cli.quiet && !cli.no_progress && !cli.json && !cli.preview;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress || !one_shot {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if !one_shot {
        // ── Interactive session ──────────────────────────────────────────
        let config = build_config(&cli, None)?;
        let driver = ExportDriver::with_default_engine(config);
        let session = Session::new(driver, Arc::new(TerminalPrompt));
        session.run().await?;
        return Ok(());
    }

    // ── One-shot batch export ────────────────────────────────────────────
    let raw = read_names_text(&cli)?;
    let names = parse_names(&raw);
    if names.is_empty() {
        anyhow::bail!("{}", CertError::NoValidNames);
    }

    if cli.preview {
        for name in &names {
            println!("{}\n", render(name, RenderMode::Preview).to_text());
        }
        return Ok(());
    }

    let mut batch = CertificateBatch::new();
    batch.replace(names);

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExportProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress)?;
    let driver = ExportDriver::with_default_engine(config);

    let result = if cli.yes {
        driver.export_all(&batch, &AlwaysConfirm).await
    } else {
        driver.export_all(&batch, &TerminalPrompt).await
    };

    let report = match result {
        Ok(report) => report,
        Err(CertError::ConfirmDeclined) => {
            eprintln!("{}", CertError::ConfirmDeclined);
            return Ok(());
        }
        Err(e) => return Err(e).context("Batch export failed"),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        // Only print inline stats when the progress callback is disabled.
        println!(
            "Exported {}/{} certificate(s) to {} in {}ms",
            report.exported,
            report.total,
            cli.out.display(),
            report.duration_ms
        );
        for item in report.items.iter().filter(|i| !i.succeeded()) {
            if let Some(ref e) = item.error {
                eprintln!("  {} {}", red("✗"), e);
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ExportConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExportConfig> {
    let mut builder = ExportConfig::builder()
        .out_dir(&cli.out)
        .policy(cli.policy.clone().into())
        .inter_item_delay_ms(cli.delay)
        .confirm_threshold(cli.threshold)
        .image_quality(cli.quality)
        .raster_scale(cli.scale);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Read the raw name text from --names, a file, or stdin.
fn read_names_text(cli: &Cli) -> Result<String> {
    if let Some(ref names) = cli.names {
        return Ok(names.clone());
    }
    let path = cli.input.as_ref().expect("clap guarantees one input source");
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read names from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|source| {
        CertError::InputReadFailed {
            path: path.clone(),
            source,
        }
        .into()
    })
}
