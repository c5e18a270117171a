//! # wxmd
//!
//! Convert between Markdown and the HTML accepted by the WeChat official
//! account editor.
//!
//! The forward pipeline renders Markdown and *proofs* the result: code lines
//! become paragraphs, indentation becomes `&nbsp;`, code and links become
//! classed spans, so the markup survives the editor's paste handler. The
//! reverse pipeline turns pasted HTML (typically a proofed article copied
//! back) into Markdown, recovering code block languages on the way.
//!
//! ## Example (forward)
//!
//! ```rust
//! use wxmd::Proofer;
//!
//! let html = Proofer::new().proof(r#"<p><a href="x">hi</a></p>"#);
//! assert_eq!(html, r#"<p><span class="link">hi</span></p>"#);
//! ```
//!
//! ## Example (reverse)
//!
//! ```rust
//! use wxmd::MarkdownGenerator;
//!
//! let generator = MarkdownGenerator::new();
//! let markdown = generator.generate(r#"<pre><code class="lang-js">var a=1;</code></pre>"#);
//! assert_eq!(markdown, "```js\nvar a = 1;\n```");
//! ```

pub mod beautify;
pub mod config;
pub mod highlight;
pub mod language;
pub mod lines;
pub mod markdown;
pub mod proof;
pub mod render;
pub mod sanitize;
pub mod session;

pub use beautify::{Beautifier, BeautifierRegistry, BeautifyError};
pub use config::Config;
pub use highlight::{Highlighter, PlainHighlighter};
#[cfg(feature = "syntax-highlighting")]
pub use highlight::SyntectHighlighter;
pub use language::Language;
pub use markdown::{Filter, HeadingStyle, MarkdownGenerator, MarkdownOptions, Rule};
pub use proof::{ProofOptions, ProofReport, Proofer};
pub use render::{CmarkRenderer, MarkdownRenderer};
pub use sanitize::sanitize_clipboard_html;
pub use session::{
    ClipboardPayload, DraftStore, EditorSession, EditorSurface, FileDraftStore, MemoryDraftStore,
    PreviewTarget, TextBuffer, LAST_CONTENT_KEY,
};

/// Error type for wxmd operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid selector {0}")]
    Selector(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Render Markdown and proof it with default options
pub fn markdown_to_wechat_html(markdown: &str) -> String {
    EditorSession::new().preview_html(markdown)
}

/// Sanitize pasted HTML and convert it to Markdown with default options
pub fn clipboard_html_to_markdown(html: &str) -> String {
    EditorSession::new().generate_markdown_from_clipboard_html(html)
}
