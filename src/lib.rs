//! # md2pdf
//!
//! Convert Markdown documents to styled PDF files through a headless browser.
//!
//! ## Why a browser?
//!
//! Laying out text, tables, code blocks and images across pages is exactly
//! what a browser print engine already does well. This crate renders the
//! Markdown to HTML, wraps it in a clean default stylesheet, and lets headless
//! Chrome paginate and print it, so anything CSS can express (custom fonts,
//! colours, page breaks) carries straight into the PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown file
//!  │
//!  ├─ 1. Input     validate path, derive output path + title, read files
//!  ├─ 2. Markdown  CommonMark + GFM → HTML fragment (pulldown-cmark)
//!  ├─ 3. Assemble  fragment + default CSS + custom CSS + title → document
//!  └─ 4. Print     headless Chrome: load, wait for network idle, print A4
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2pdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .style("theme.css")
//!         .title("Release Notes")
//!         .build()?;
//!     let output = convert("notes.md", &config).await?;
//!     println!("wrote {}", output.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! md2pdf = { version = "1", default-features = false }
//! ```
//!
//! ## Custom renderers
//!
//! The browser sits behind [`PdfRenderer`]. Set
//! [`ConversionConfigBuilder::renderer`] to print through something else, or
//! to a fake in tests.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, MAX_RENDER_TIMEOUT_SECS};
pub use convert::{assemble_html, convert, convert_sync};
pub use error::{Md2PdfError, RenderError};
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::assemble::{AssembledDocument, DEFAULT_STYLESHEET};
pub use pipeline::markdown::MarkdownExtensions;
pub use pipeline::print::{ChromeRenderer, Margins, PaperSize, PdfRenderer, PrintOptions};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
