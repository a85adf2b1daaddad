//! Configuration types for Markdown-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The config is immutable once built and
//! passed by reference through every pipeline stage; each stage reads only the
//! fields it needs.

use crate::error::Md2PdfError;
use crate::pipeline::markdown::MarkdownExtensions;
use crate::pipeline::print::{PdfRenderer, PrintOptions};
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Largest accepted render timeout: one day.
pub const MAX_RENDER_TIMEOUT_SECS: u64 = 86_400;

/// Configuration for a Markdown-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use md2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output("out/report.pdf")
///     .title("Quarterly Report")
///     .render_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Destination PDF path. If None, the input's sibling `<stem>.pdf` is used.
    pub output: Option<PathBuf>,

    /// Custom CSS file appended after the default stylesheet.
    /// A path that does not exist is ignored silently.
    pub style: Option<PathBuf>,

    /// Document title. If None, the input's file stem is used.
    pub title: Option<String>,

    /// Deadline for loading and settling the page, in seconds. Default: 30.
    ///
    /// Navigation and the network-idle wait share this one deadline. A page
    /// that keeps polling a remote resource never goes idle; without a bound
    /// the conversion would hang forever. Browser launch and the final
    /// `printToPDF` call are bounded separately by the DevTools client.
    /// At most [`MAX_RENDER_TIMEOUT_SECS`].
    pub render_timeout_secs: u64,

    /// Quiet window for the network-idle check in milliseconds. Default: 500.
    ///
    /// The page counts as settled once no new resource has started loading
    /// for this long and all images and fonts report complete.
    pub idle_window_ms: u64,

    /// Explicit Chrome/Chromium executable. If None, the engine searches the
    /// usual install locations and `CHROME` env var.
    pub chrome_path: Option<PathBuf>,

    /// Run the browser with its sandbox enabled. Default: true.
    ///
    /// Containers running as root usually need this off.
    pub sandbox: bool,

    /// Emit a `<base href>` pointing at the input's directory so relative
    /// image and link paths resolve against the Markdown file. Default: true.
    pub resolve_relative_links: bool,

    /// Page geometry handed to the renderer. Default: A4, 40px margins, backgrounds on.
    pub print: PrintOptions,

    /// Markdown syntax extensions. Default: tables, strikethrough, task lists, footnotes.
    pub markdown: MarkdownExtensions,

    /// Pre-constructed renderer. Takes precedence over the built-in Chrome renderer.
    pub renderer: Option<Arc<dyn PdfRenderer>>,

    /// Optional stage-progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output: None,
            style: None,
            title: None,
            render_timeout_secs: 30,
            idle_window_ms: 500,
            chrome_path: None,
            sandbox: true,
            resolve_relative_links: true,
            print: PrintOptions::default(),
            markdown: MarkdownExtensions::default(),
            renderer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output", &self.output)
            .field("style", &self.style)
            .field("title", &self.title)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("idle_window_ms", &self.idle_window_ms)
            .field("chrome_path", &self.chrome_path)
            .field("sandbox", &self.sandbox)
            .field("resolve_relative_links", &self.resolve_relative_links)
            .field("print", &self.print)
            .field("markdown", &self.markdown)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn PdfRenderer>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = Some(path.into());
        self
    }

    pub fn style(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.style = Some(path.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs;
        self
    }

    pub fn idle_window_ms(mut self, ms: u64) -> Self {
        self.config.idle_window_ms = ms;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn sandbox(mut self, v: bool) -> Self {
        self.config.sandbox = v;
        self
    }

    pub fn resolve_relative_links(mut self, v: bool) -> Self {
        self.config.resolve_relative_links = v;
        self
    }

    pub fn print(mut self, options: PrintOptions) -> Self {
        self.config.print = options;
        self
    }

    pub fn markdown(mut self, extensions: MarkdownExtensions) -> Self {
        self.config.markdown = extensions;
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PdfRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2PdfError> {
        let c = &self.config;
        if c.render_timeout_secs == 0 {
            return Err(Md2PdfError::InvalidConfig(
                "Render timeout must be ≥ 1 second".into(),
            ));
        }
        if c.render_timeout_secs > MAX_RENDER_TIMEOUT_SECS {
            return Err(Md2PdfError::InvalidConfig(format!(
                "Render timeout must be ≤ {MAX_RENDER_TIMEOUT_SECS} seconds, got {}",
                c.render_timeout_secs
            )));
        }
        if c.idle_window_ms >= c.render_timeout_secs.saturating_mul(1000) {
            return Err(Md2PdfError::InvalidConfig(format!(
                "Idle window ({}ms) must be shorter than the render timeout ({}s)",
                c.idle_window_ms, c.render_timeout_secs
            )));
        }
        if let Some(ref title) = c.title {
            if title.trim().is_empty() {
                return Err(Md2PdfError::InvalidConfig("Title must not be blank".into()));
            }
        }
        c.print.validate()?;
        Ok(self.config)
    }
}
