//! Result types returned by a successful conversion.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a caller may want to know about a finished conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Path of the Markdown source that was converted.
    pub input_path: PathBuf,
    /// Path the PDF was written to.
    pub output_path: PathBuf,
    /// Title placed in the document `<title>` (and thus the PDF metadata).
    pub title: String,
    /// Whether a custom stylesheet was found and appended.
    pub custom_style_applied: bool,
    /// Timing and size figures.
    pub stats: ConversionStats,
}

/// Per-stage timings and sizes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Bytes of Markdown read from the input.
    pub markdown_bytes: usize,
    /// Bytes of the assembled HTML document.
    pub html_bytes: usize,
    /// Size of the written PDF, 0 if the renderer produced nothing readable.
    pub pdf_bytes: u64,
    /// Time spent reading input files.
    pub load_duration_ms: u64,
    /// Markdown parsing plus document assembly.
    pub assemble_duration_ms: u64,
    /// Browser launch, page settle and print.
    pub render_duration_ms: u64,
    /// Wall-clock time of the whole conversion.
    pub total_duration_ms: u64,
}
