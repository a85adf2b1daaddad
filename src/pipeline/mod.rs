//! Pipeline stages for Markdown-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the rendering backend can be swapped without
//! touching the other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ markdown ──▶ assemble ──▶ print
//! (files)   (fragment)   (document)   (headless Chrome → PDF)
//! ```
//!
//! 1. [`input`]: validate the source path, derive output path and title,
//!    read the Markdown and optional CSS
//! 2. [`markdown`]: CommonMark + GFM extensions to an HTML fragment
//! 3. [`assemble`]: wrap the fragment with the default stylesheet, custom
//!    CSS and title
//! 4. [`print`]: the only stage with an external process; runs in
//!    `spawn_blocking` because the DevTools client is synchronous

pub mod assemble;
pub mod input;
pub mod markdown;
pub mod print;
