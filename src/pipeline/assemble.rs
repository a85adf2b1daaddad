//! Document assembly: wrap an HTML fragment in a complete, styled HTML page.
//!
//! The title and any custom CSS are inserted verbatim. Nothing is escaped,
//! so the assembler must only be fed trusted content. Custom CSS goes after
//! the default rules inside the same `<style>` element, so a user rule beats
//! a default rule of equal specificity.

use std::path::Path;
use url::Url;

/// Stylesheet baked into every document.
pub const DEFAULT_STYLESHEET: &str = r#"body {
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
  line-height: 1.6;
  padding: 40px;
  max-width: 800px;
  margin: 0 auto;
}
pre {
  background-color: #f5f5f5;
  padding: 12px;
  border-radius: 4px;
  overflow-x: auto;
}
code {
  font-family: "SFMono-Regular", Consolas, "Liberation Mono", Menlo, monospace;
  font-size: 85%;
}
img {
  max-width: 100%;
}
table {
  border-collapse: collapse;
  width: 100%;
}
table, th, td {
  border: 1px solid #ddd;
}
th, td {
  padding: 8px;
  text-align: left;
}
th {
  background-color: #f2f2f2;
}
"#;

/// A complete HTML document ready for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    pub title: String,
    pub html: String,
}

impl AssembledDocument {
    pub fn len(&self) -> usize {
        self.html.len()
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// Build the full document around `body_html`.
pub fn assemble(
    body_html: &str,
    custom_css: Option<&str>,
    title: &str,
    base_url: Option<&Url>,
) -> AssembledDocument {
    let base = base_url
        .map(|u| format!("<base href=\"{u}\">\n"))
        .unwrap_or_default();
    let custom = custom_css
        .map(|css| format!("/* custom */\n{css}\n"))
        .unwrap_or_default();

    let html = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         {base}\
         <title>{title}</title>\n\
         <style>\n\
         {DEFAULT_STYLESHEET}\
         {custom}\
         </style>\n\
         </head>\n\
         <body>\n\
         {body_html}\
         </body>\n\
         </html>\n"
    );

    AssembledDocument {
        title: title.to_string(),
        html,
    }
}

/// `file://` URL of the directory containing `input`, used as the document base.
///
/// Returns None when the path cannot be made absolute.
pub fn base_url_for(input: &Path) -> Option<Url> {
    let abs = std::fs::canonicalize(input).ok()?;
    let dir = abs.parent()?;
    Url::from_directory_path(dir).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_inserted() {
        let doc = assemble("<p>x</p>", None, "My Doc", None);
        assert!(doc.html.contains("<title>My Doc</title>"));
        assert_eq!(doc.title, "My Doc");
    }

    #[test]
    fn body_is_wrapped() {
        let doc = assemble("<h1>Hello</h1>\n", None, "t", None);
        assert!(doc.html.starts_with("<!DOCTYPE html>"));
        assert!(doc.html.contains("<body>\n<h1>Hello</h1>\n</body>"));
        assert!(doc.html.contains(r#"<meta charset="UTF-8">"#));
    }

    #[test]
    fn default_styles_present() {
        let doc = assemble("", None, "t", None);
        assert!(doc.html.contains("background-color: #f5f5f5"));
        assert!(doc.html.contains("max-width: 100%"));
        assert!(doc.html.contains("border: 1px solid #ddd"));
        assert!(doc.html.contains("padding: 8px"));
    }

    #[test]
    fn custom_css_follows_defaults() {
        let doc = assemble("", Some("body { color: red; }"), "t", None);
        let default_pos = doc.html.find("th {\n  background-color: #f2f2f2;").unwrap();
        let custom_pos = doc.html.find("body { color: red; }").unwrap();
        assert!(custom_pos > default_pos);
        let style_end = doc.html.find("</style>").unwrap();
        assert!(custom_pos < style_end);
    }

    #[test]
    fn title_and_css_are_not_escaped() {
        let doc = assemble("", Some("a::after { content: \"<>\"; }"), "R&D <draft>", None);
        assert!(doc.html.contains("<title>R&D <draft></title>"));
        assert!(doc.html.contains("content: \"<>\""));
    }

    #[test]
    fn base_href_only_when_given() {
        let without = assemble("", None, "t", None);
        assert!(!without.html.contains("<base"));

        let url = Url::parse("file:///home/me/docs/").unwrap();
        let with = assemble("", None, "t", Some(&url));
        assert!(with.html.contains(r#"<base href="file:///home/me/docs/">"#));
    }

    #[test]
    fn base_url_points_at_parent_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("notes.md");
        std::fs::write(&input, "x").unwrap();

        let url = base_url_for(&input).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.as_str().ends_with('/'));
        let back = url.to_file_path().unwrap();
        assert_eq!(back, std::fs::canonicalize(dir.path()).unwrap());
    }
}
