//! Conversion entry points.
//!
//! [`convert`] runs the whole pipeline and writes the PDF. [`assemble_html`]
//! stops after document assembly, which needs no browser and is what the CLI
//! uses for `--emit-html`.

use crate::config::ConversionConfig;
use crate::error::Md2PdfError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::assemble::{self, AssembledDocument};
use crate::pipeline::input::{self, LoadedInput};
use crate::pipeline::markdown;
use crate::pipeline::print::{ChromeRenderer, PdfRenderer};
use crate::progress::Stage;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Convert a Markdown file to PDF.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input`: Path to an existing Markdown file
/// * `config`: Conversion configuration
///
/// # Errors
/// Any failure aborts the pipeline immediately:
/// - Input missing or unreadable ([`Md2PdfError::InputNotFound`] and friends)
/// - Style file present but unreadable
/// - Rendering engine failure or timeout ([`Md2PdfError::Render`]); the
///   browser is shut down before the error is returned and no output file
///   is written
pub async fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2PdfError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    info!("Starting conversion: {}", input.display());
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(input);
    }

    // ── Step 1: Resolve and read input ───────────────────────────────────
    let load_start = stage_start(config, Stage::Load);
    let loaded = load_input(input, config).await?;
    let load_duration_ms = stage_complete(config, Stage::Load, load_start);

    // ── Step 2-3: Markdown → HTML document ───────────────────────────────
    let assemble_start = Instant::now();
    let document = build_document(&loaded, config);
    let assemble_duration_ms = assemble_start.elapsed().as_millis() as u64;

    // ── Step 4: Print ────────────────────────────────────────────────────
    let output_path = loaded.request.output_path.clone();
    let render_start = stage_start(config, Stage::Print);
    render_document(&document, &output_path, config).await?;
    let render_duration_ms = stage_complete(config, Stage::Print, render_start);

    let pdf_bytes = tokio::fs::metadata(&output_path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);

    let stats = ConversionStats {
        markdown_bytes: loaded.markdown.len(),
        html_bytes: document.len(),
        pdf_bytes,
        load_duration_ms,
        assemble_duration_ms,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} ({} bytes, {}ms total)",
        output_path.display(),
        pdf_bytes,
        stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(&output_path);
    }

    Ok(ConversionOutput {
        input_path: loaded.request.input_path,
        output_path,
        title: document.title,
        custom_style_applied: loaded.custom_css.is_some(),
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Md2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, config))
}

/// Run the pipeline up to document assembly and return the HTML.
///
/// Does not launch a browser and writes nothing.
pub async fn assemble_html(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<AssembledDocument, Md2PdfError> {
    let loaded = load_input(input.as_ref(), config).await?;
    Ok(build_document(&loaded, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn load_input(input: &Path, config: &ConversionConfig) -> Result<LoadedInput, Md2PdfError> {
    let request = input::resolve_request(input, config)?;
    input::load(request).await
}

fn build_document(loaded: &LoadedInput, config: &ConversionConfig) -> AssembledDocument {
    let start = stage_start(config, Stage::Markdown);
    let body = markdown::to_html(&loaded.markdown, config.markdown);
    stage_complete(config, Stage::Markdown, start);
    debug!(
        "Markdown rendered: {} → {} bytes",
        loaded.markdown.len(),
        body.len()
    );

    let start = stage_start(config, Stage::Assemble);
    let base_url = if config.resolve_relative_links {
        assemble::base_url_for(&loaded.request.input_path)
    } else {
        None
    };
    let document = assemble::assemble(
        &body,
        loaded.custom_css.as_deref(),
        &loaded.title,
        base_url.as_ref(),
    );
    stage_complete(config, Stage::Assemble, start);
    document
}

/// Pick the renderer, from most-specific to least-specific: a pre-built
/// renderer on the config, else headless Chrome configured from the config.
fn resolve_renderer(config: &ConversionConfig) -> Arc<dyn PdfRenderer> {
    if let Some(ref renderer) = config.renderer {
        return Arc::clone(renderer);
    }
    Arc::new(
        ChromeRenderer::new()
            .chrome_path(config.chrome_path.clone())
            .sandbox(config.sandbox)
            .timeout(Duration::from_secs(config.render_timeout_secs))
            .idle_window(Duration::from_millis(config.idle_window_ms)),
    )
}

/// Render on the blocking pool; the DevTools client blocks on every call.
async fn render_document(
    document: &AssembledDocument,
    destination: &Path,
    config: &ConversionConfig,
) -> Result<(), Md2PdfError> {
    let renderer = resolve_renderer(config);
    let html = document.html.clone();
    let destination = destination.to_path_buf();
    let options = config.print;

    tokio::task::spawn_blocking(move || renderer.render(&html, &destination, &options))
        .await
        .map_err(|e| Md2PdfError::Internal(format!("Render task panicked: {}", e)))??;
    Ok(())
}

fn stage_start(config: &ConversionConfig, stage: Stage) -> Instant {
    debug!("Stage started: {}", stage);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
    Instant::now()
}

fn stage_complete(config: &ConversionConfig, stage: Stage, start: Instant) -> u64 {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage, elapsed_ms);
    }
    elapsed_ms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::pipeline::print::PrintOptions;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records the HTML it receives and writes a stub PDF.
    #[derive(Default)]
    struct StubRenderer {
        seen: Mutex<Option<String>>,
    }

    impl PdfRenderer for StubRenderer {
        fn render(
            &self,
            html: &str,
            destination: &Path,
            _options: &PrintOptions,
        ) -> Result<(), RenderError> {
            *self.seen.lock().unwrap() = Some(html.to_string());
            std::fs::write(destination, b"%PDF-1.7 stub").map_err(|source| RenderError::Write {
                path: destination.to_path_buf(),
                source,
            })
        }
    }

    #[test]
    fn convert_sync_uses_injected_renderer() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("report.md");
        std::fs::write(&input, "# Report\n").unwrap();

        let stub = Arc::new(StubRenderer::default());
        let config = ConversionConfig::builder()
            .renderer(stub.clone())
            .build()
            .unwrap();

        let out = convert_sync(&input, &config).unwrap();
        assert_eq!(out.output_path, dir.path().join("report.pdf"));
        assert_eq!(out.title, "report");
        assert_eq!(out.stats.pdf_bytes, 13);
        let html = stub.seen.lock().unwrap().clone().unwrap();
        assert!(html.contains("<h1>Report</h1>"));
    }

    #[test]
    fn assemble_html_needs_no_renderer() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("notes.md");
        std::fs::write(&input, "hello").unwrap();

        let config = ConversionConfig::builder()
            .resolve_relative_links(false)
            .build()
            .unwrap();
        let doc = tokio_test::block_on(assemble_html(&input, &config)).unwrap();
        assert!(doc.html.contains("<title>notes</title>"));
        assert!(doc.html.contains("<p>hello</p>"));
        assert!(!doc.html.contains("<base"));
        assert!(!dir.path().join("notes.pdf").exists());
    }
}
