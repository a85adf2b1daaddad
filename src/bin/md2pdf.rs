//! CLI binary for md2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and reports the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use md2pdf::{
    assemble_html, convert, ConversionConfig, ConversionProgressCallback, ProgressCallback, Stage,
    MAX_RENDER_TIMEOUT_SECS,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner that names the running stage and logs each finished one.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("md2pdf");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn abandon(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        let msg = match stage {
            Stage::Print => format!("{}…  {}", stage, dim("launching browser")),
            _ => format!("{stage}…"),
        };
        self.bar.set_message(msg);
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<20} {}",
            green("✓"),
            stage.label(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_conversion_complete(&self, _output: &Path) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (writes notes.pdf next to notes.md)
  md2pdf notes.md

  # Explicit output path and title
  md2pdf notes.md -o build/notes.pdf -t "Team Notes"

  # Custom stylesheet, appended after the built-in one
  md2pdf report.md -s theme.css

  # Inside a container running as root
  md2pdf report.md --no-sandbox --chrome /usr/bin/chromium

  # Keep the intermediate HTML for debugging styles
  md2pdf report.md --emit-html report.html

PAGE SETUP:
  A4 paper, 40px margins on every side, background colours and images printed.

ENVIRONMENT VARIABLES:
  CHROME_PATH      Chrome/Chromium executable to launch
  MD2PDF_TIMEOUT   Render timeout in seconds (default 30)
  RUST_LOG         Log filter, overrides -v / -q
"#;

/// Convert Markdown files to PDF.
#[derive(Parser, Debug)]
#[command(
    name = "md2pdf",
    version,
    about = "Convert Markdown files to PDF",
    long_about = "Convert a Markdown file to a styled PDF. The Markdown is rendered to HTML, \
wrapped in a default stylesheet (plus any custom CSS), and printed to PDF by headless \
Chrome/Chromium.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input markdown file path.
    input: PathBuf,

    /// Output PDF file path. Default: input path with a .pdf extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Custom CSS file path. Ignored if the file does not exist.
    #[arg(short, long)]
    style: Option<PathBuf>,

    /// Document title. Default: input file name without extension.
    #[arg(short, long)]
    title: Option<String>,

    /// Seconds allowed for the page to load and settle (1 to 86400).
    #[arg(long, env = "MD2PDF_TIMEOUT", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..=MAX_RENDER_TIMEOUT_SECS))]
    timeout: u64,

    /// Network-idle quiet window in milliseconds.
    #[arg(long, env = "MD2PDF_IDLE_MS", default_value_t = 500)]
    idle_ms: u64,

    /// Chrome/Chromium executable.
    #[arg(long, env = "CHROME_PATH")]
    chrome: Option<PathBuf>,

    /// Launch the browser without its sandbox (needed when running as root).
    #[arg(long)]
    no_sandbox: bool,

    /// Also write the assembled HTML document to this path.
    #[arg(long)]
    emit_html: Option<PathBuf>,

    /// Print the conversion result as JSON instead of a message.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "MD2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers what INFO logs would say; keep them out of its way.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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

    let progress = show_progress.then(CliProgressCallback::new);

    if let Err(e) = run(&cli, progress.clone()).await {
        if let Some(ref p) = progress {
            p.abandon();
        }
        eprintln!("{} {:#}", red("Error during conversion:"), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, progress: Option<Arc<CliProgressCallback>>) -> Result<()> {
    let progress_cb = progress.map(|cb| cb as ProgressCallback);
    let config = build_config(cli, progress_cb)?;

    if let Some(ref html_path) = cli.emit_html {
        let document = assemble_html(&cli.input, &config).await?;
        tokio::fs::write(html_path, &document.html)
            .await
            .with_context(|| format!("Failed to write HTML to {}", html_path.display()))?;
        if !cli.quiet && !cli.json {
            eprintln!("{} HTML written to {}", dim("·"), html_path.display());
        }
    }

    let output = convert(&cli.input, &config).await?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        println!("Conversion completed successfully!");
        println!(
            "{}  {}  {}",
            green("✔"),
            bold(&output.output_path.display().to_string()),
            dim(&format!(
                "{} KB, {}ms",
                output.stats.pdf_bytes.div_ceil(1024),
                output.stats.total_duration_ms
            )),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .render_timeout_secs(cli.timeout)
        .idle_window_ms(cli.idle_ms)
        .sandbox(!cli.no_sandbox);

    if let Some(ref output) = cli.output {
        builder = builder.output(output);
    }
    if let Some(ref style) = cli.style {
        builder = builder.style(style);
    }
    if let Some(ref title) = cli.title {
        builder = builder.title(title);
    }
    if let Some(ref chrome) = cli.chrome {
        builder = builder.chrome_path(chrome);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_short_flags() {
        let cli = Cli::try_parse_from([
            "md2pdf", "notes.md", "-o", "out.pdf", "-s", "theme.css", "-t", "My Doc",
        ])
        .unwrap();
        assert_eq!(cli.input, PathBuf::from("notes.md"));
        assert_eq!(cli.output, Some(PathBuf::from("out.pdf")));
        assert_eq!(cli.style, Some(PathBuf::from("theme.css")));
        assert_eq!(cli.title.as_deref(), Some("My Doc"));
    }

    #[test]
    fn config_maps_flags() {
        let cli = Cli::try_parse_from([
            "md2pdf",
            "notes.md",
            "--title",
            "T",
            "--timeout",
            "45",
            "--no-sandbox",
        ])
        .unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.title.as_deref(), Some("T"));
        assert_eq!(config.render_timeout_secs, 45);
        assert!(!config.sandbox);
        assert!(config.output.is_none());
    }

    #[test]
    fn zero_timeout_rejected_by_parser() {
        assert!(Cli::try_parse_from(["md2pdf", "a.md", "--timeout", "0"]).is_err());
    }

    #[test]
    fn huge_timeout_rejected_by_parser() {
        let huge = u64::MAX.to_string();
        assert!(Cli::try_parse_from(["md2pdf", "a.md", "--timeout", &huge]).is_err());
        assert!(Cli::try_parse_from(["md2pdf", "a.md", "--timeout", "86400"]).is_ok());
    }

    #[test]
    fn config_error_is_not_wrapped_twice() {
        let cli = Cli::try_parse_from(["md2pdf", "a.md", "--timeout", "1", "--idle-ms", "5000"])
            .unwrap();
        let err = build_config(&cli, None).unwrap_err();
        let msg = format!("{err:#}");
        assert_eq!(msg.matches("Invalid configuration").count(), 1, "got: {msg}");
    }
}
