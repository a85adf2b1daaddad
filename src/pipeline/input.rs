//! Input resolution: validate the Markdown path, derive output path and
//! title, and read the source files.
//!
//! Resolution and reading are split so the cheap checks (does the input
//! exist, where will the PDF go) happen before any file is read. A missing
//! input therefore aborts before anything else runs, and no output file is
//! ever created for it.

use crate::config::ConversionConfig;
use crate::error::Md2PdfError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A validated conversion request: every path is resolved, nothing is read yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Existing Markdown file.
    pub input_path: PathBuf,
    /// Explicit `--output`, or the input's sibling `<stem>.pdf`.
    pub output_path: PathBuf,
    /// Custom CSS file, if one was requested (it may not exist).
    pub style_path: Option<PathBuf>,
    /// Explicit title, if one was requested.
    pub title: Option<String>,
}

impl ConversionRequest {
    /// Title used for the document: the explicit one, else the input's stem.
    pub fn resolved_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| default_title(&self.input_path))
    }
}

/// The request together with the file contents it refers to.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub request: ConversionRequest,
    pub markdown: String,
    /// CSS text, present only if the style file existed.
    pub custom_css: Option<String>,
    pub title: String,
}

/// Validate the input path and resolve output path, style and title.
pub fn resolve_request(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionRequest, Md2PdfError> {
    let input_path = input.as_ref().to_path_buf();

    if !input_path.exists() {
        return Err(Md2PdfError::InputNotFound { path: input_path });
    }
    if !input_path.is_file() {
        return Err(Md2PdfError::InputNotAFile { path: input_path });
    }

    // Check read permission by attempting to open
    match std::fs::File::open(&input_path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Md2PdfError::PermissionDenied { path: input_path });
        }
        Err(e) => {
            return Err(Md2PdfError::ReadFailed {
                path: input_path,
                source: e,
            });
        }
    }

    let output_path = config
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&input_path));

    debug!(
        "Resolved request: {} → {}",
        input_path.display(),
        output_path.display()
    );

    Ok(ConversionRequest {
        input_path,
        output_path,
        style_path: config.style.clone(),
        title: config.title.clone(),
    })
}

/// Read the Markdown source and, if it exists, the custom stylesheet.
pub async fn load(request: ConversionRequest) -> Result<LoadedInput, Md2PdfError> {
    let markdown = tokio::fs::read_to_string(&request.input_path)
        .await
        .map_err(|e| Md2PdfError::ReadFailed {
            path: request.input_path.clone(),
            source: e,
        })?;

    let custom_css = match request.style_path {
        Some(ref style) if style.exists() => {
            let css = tokio::fs::read_to_string(style)
                .await
                .map_err(|e| Md2PdfError::ReadFailed {
                    path: style.clone(),
                    source: e,
                })?;
            debug!("Loaded custom stylesheet: {} ({} bytes)", style.display(), css.len());
            Some(css)
        }
        Some(ref style) => {
            debug!("Style file not found, ignoring: {}", style.display());
            None
        }
        None => None,
    };

    let title = request.resolved_title();

    Ok(LoadedInput {
        request,
        markdown,
        custom_css,
        title,
    })
}

/// Sibling path of `input` with the extension replaced by `.pdf`.
///
/// `docs/report.md` → `docs/report.pdf`, `README` → `README.pdf`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("pdf")
}

/// Base name of `input` with its last extension stripped.
pub fn default_title(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}
