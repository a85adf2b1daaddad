//! Markdown → HTML fragment via `pulldown-cmark`.

use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};

/// Which syntax extensions beyond CommonMark are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownExtensions {
    /// GFM pipe tables.
    pub tables: bool,
    /// `~~struck~~` text.
    pub strikethrough: bool,
    /// `- [x] done` list items.
    pub tasklists: bool,
    /// `[^1]` references and definitions.
    pub footnotes: bool,
    /// Curly quotes, en/em dashes and ellipses.
    pub smart_punctuation: bool,
}

impl Default for MarkdownExtensions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            footnotes: true,
            smart_punctuation: false,
        }
    }
}

impl MarkdownExtensions {
    fn options(self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        options
    }
}

/// Render Markdown source to an HTML fragment (no `<html>`/`<body>` wrapper).
///
/// Raw HTML in the source is passed through unchanged.
pub fn to_html(markdown: &str, extensions: MarkdownExtensions) -> String {
    let parser = Parser::new_ext(markdown, extensions.options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
