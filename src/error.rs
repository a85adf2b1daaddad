//! Error types for the md2pdf library.
//!
//! Two error types mirror the two halves of the pipeline:
//!
//! * [`Md2PdfError`]: **Fatal** for the whole conversion (missing input,
//!   unreadable file, bad configuration). Returned from the top-level
//!   `convert*` functions.
//!
//! * [`RenderError`]: raised by a [`crate::pipeline::print::PdfRenderer`]
//!   while driving the rendering engine. It is wrapped into
//!   [`Md2PdfError::Render`] when it reaches the orchestration layer, so
//!   renderer implementations never need to know about input handling.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the md2pdf library.
#[derive(Debug, Error)]
pub enum Md2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{}'", .path.display())]
    InputNotFound { path: PathBuf },

    /// The input path exists but is a directory or other non-file entry.
    #[error("Input path is not a regular file: '{}'", .path.display())]
    InputNotAFile { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{}'. Try: chmod +r {path:?}", .path.display())]
    PermissionDenied { path: PathBuf },

    /// The input or style file could not be read as UTF-8 text.
    #[error("Failed to read '{}'", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The rendering engine failed to produce the PDF.
    #[error(transparent)]
    Render(#[from] RenderError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures raised while driving the rendering engine.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The browser process could not be started.
    #[error(
        "Failed to launch headless browser: {0}. \
Install Chrome or Chromium, or point --chrome / CHROME_PATH at an existing binary."
    )]
    Launch(String),

    /// The assembled document could not be loaded into a page.
    #[error("Failed to load document into the browser: {0}")]
    Load(String),

    /// The page never settled within the render timeout.
    #[error("Page did not become idle within {secs}s. Increase --timeout if the document loads slow remote resources.")]
    Timeout { secs: u64 },

    /// The browser refused or failed to print the page.
    #[error("Failed to print page to PDF: {0}")]
    Print(String),

    /// The PDF bytes could not be written to the destination.
    #[error("Failed to write output file '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
