//! Editor session: the host-facing surface tying both pipelines to the
//! editor widget, the preview pane and the draft store.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, warn};
use wxmd_dom::Fragment;

use crate::config::Config;
use crate::markdown::MarkdownGenerator;
use crate::proof::Proofer;
use crate::render::{CmarkRenderer, MarkdownRenderer};
use crate::sanitize::sanitize_fragment;
use crate::Result;

/// Draft key holding the most recently previewed Markdown
pub const LAST_CONTENT_KEY: &str = "__lastContent";

/// Key-value persistence for drafts. Writes are fire-and-forget.
pub trait DraftStore {
    fn set(&mut self, key: &str, value: &str);
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory draft store
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    entries: IndexMap<String, String>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Draft store keeping one `<key>.md` file per key in a directory
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`; characters unsafe in file names are
    /// replaced by `_`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.md", name))
    }

    /// Write a draft, reporting failures
    pub fn try_set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

impl DraftStore for FileDraftStore {
    fn set(&mut self, key: &str, value: &str) {
        if let Err(err) = self.try_set(key, value) {
            warn!(key, dir = %self.dir.display(), error = %err, "failed to store draft");
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }
}

/// Where proofed preview HTML is written
pub trait PreviewTarget {
    fn set_html(&mut self, html: &str);
}

impl PreviewTarget for String {
    fn set_html(&mut self, html: &str) {
        self.clear();
        self.push_str(html);
    }
}

/// The text-editing widget receiving pasted Markdown
pub trait EditorSurface {
    /// Byte range of the current selection, if any
    fn selection(&self) -> Option<Range<usize>>;

    fn replace_selection(&mut self, text: &str);

    fn insert_at_cursor(&mut self, text: &str);
}

/// Plain text buffer with a cursor and an optional selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
    selection: Option<Range<usize>>,
}

impl TextBuffer {
    /// Buffer with the cursor at the end of `text`
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self {
            text,
            cursor,
            selection: None,
        }
    }

    /// Move the cursor, clamped to the text and to a character boundary
    pub fn with_cursor(mut self, offset: usize) -> Self {
        self.cursor = self.clamp(offset);
        self.selection = None;
        self
    }

    /// Select a byte range, clamped like the cursor
    pub fn select(&mut self, range: Range<usize>) {
        let start = self.clamp(range.start);
        let end = self.clamp(range.end).max(start);
        self.selection = Some(start..end);
        self.cursor = end;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn into_text(self) -> String {
        self.text
    }

    fn clamp(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

impl EditorSurface for TextBuffer {
    fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    fn replace_selection(&mut self, text: &str) {
        let range = self.selection.take().unwrap_or(self.cursor..self.cursor);
        self.text.replace_range(range.clone(), text);
        self.cursor = range.start + text.len();
    }

    fn insert_at_cursor(&mut self, text: &str) {
        self.selection = None;
        self.replace_selection(text);
    }
}

/// The two clipboard flavors offered by a paste event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub html: String,
    pub text: String,
}

impl ClipboardPayload {
    pub fn new(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            text: text.into(),
        }
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self::new(html, "")
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new("", text)
    }

    /// Whether the HTML flavor carries anything
    pub fn has_html(&self) -> bool {
        !self.html.trim().is_empty()
    }
}

/// Editor context: renderer, draft store and both transformers.
pub struct EditorSession<R = CmarkRenderer, S = MemoryDraftStore> {
    renderer: R,
    store: S,
    proofer: Proofer,
    generator: MarkdownGenerator,
}

impl EditorSession {
    /// Session with the default renderer and an in-memory draft store
    pub fn new() -> Self {
        Self::with_parts(CmarkRenderer::new(), MemoryDraftStore::new())
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, S> EditorSession<R, S>
where
    R: MarkdownRenderer,
    S: DraftStore,
{
    pub fn with_parts(renderer: R, store: S) -> Self {
        Self::with_config(renderer, store, &Config::default())
    }

    pub fn with_config(renderer: R, store: S, config: &Config) -> Self {
        Self {
            renderer,
            store,
            proofer: Proofer::with_options(config.proof.clone()),
            generator: MarkdownGenerator::with_options(config.markdown.clone()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn proofer(&self) -> &Proofer {
        &self.proofer
    }

    /// The generator, e.g. to add rules
    pub fn generator_mut(&mut self) -> &mut MarkdownGenerator {
        &mut self.generator
    }

    /// Render and proof Markdown without touching the draft store
    pub fn preview_html(&self, markdown: &str) -> String {
        let html = self.renderer.render(markdown);
        self.proofer.proof(&html)
    }

    /// Store the draft, then write the proofed preview to `target`
    pub fn render_preview<T>(&mut self, target: &mut T, markdown: &str)
    where
        T: PreviewTarget + ?Sized,
    {
        self.store.set(LAST_CONTENT_KEY, markdown);
        target.set_html(&self.preview_html(markdown));
    }

    /// Sanitize pasted HTML and convert it to Markdown
    pub fn generate_markdown_from_clipboard_html(&self, html: &str) -> String {
        let mut fragment = Fragment::parse(html);
        sanitize_fragment(&mut fragment);
        self.generator.generate_fragment(&fragment)
    }

    /// Insert a paste into the editor, replacing the selection if there is
    /// one. Returns the inserted Markdown.
    pub fn handle_paste<E>(&self, payload: &ClipboardPayload, editor: &mut E) -> String
    where
        E: EditorSurface + ?Sized,
    {
        let markdown = if payload.has_html() {
            self.generate_markdown_from_clipboard_html(&payload.html)
        } else {
            payload.text.clone()
        };
        debug!(from_html = payload.has_html(), bytes = markdown.len(), "handling paste");

        if editor.selection().is_some() {
            editor.replace_selection(&markdown);
        } else {
            editor.insert_at_cursor(&markdown);
        }
        markdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::PlainHighlighter;

    fn session() -> EditorSession {
        EditorSession::with_parts(
            CmarkRenderer::with_highlighter(Box::new(PlainHighlighter)),
            MemoryDraftStore::new(),
        )
    }

    #[test]
    fn test_render_preview_stores_draft() {
        let mut session = session();
        let mut preview = String::from("stale");
        session.render_preview(&mut preview, "[hi](x)");
        assert_eq!(preview, "<p><span class=\"link\">hi</span></p>\n");
        assert_eq!(session.store().get(LAST_CONTENT_KEY).as_deref(), Some("[hi](x)"));
    }

    #[test]
    fn test_paste_html_at_cursor() {
        let session = session();
        let mut editor = TextBuffer::new("ab").with_cursor(1);
        let inserted = session.handle_paste(&ClipboardPayload::new("<b>x</b>", "x"), &mut editor);
        assert_eq!(inserted, "**x**");
        assert_eq!(editor.text(), "a**x**b");
        assert_eq!(editor.cursor(), 6);
    }

    #[test]
    fn test_paste_text_replaces_selection() {
        let session = session();
        let mut editor = TextBuffer::new("hello world");
        editor.select(6..11);
        session.handle_paste(&ClipboardPayload::text("*there*"), &mut editor);
        assert_eq!(editor.text(), "hello *there*");
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn test_empty_html_uses_plain_text() {
        let session = session();
        let mut editor = TextBuffer::default();
        session.handle_paste(&ClipboardPayload::new("", "<b>raw</b>"), &mut editor);
        assert_eq!(editor.text(), "<b>raw</b>");
    }

    #[test]
    fn test_clipboard_language_round_trip() {
        let session = session();
        let preview = session.preview_html("```css\na{color:red}\n```\n");
        assert!(preview.contains("language-css"));
        assert_eq!(
            session.generate_markdown_from_clipboard_html(&preview),
            "```css\na {\n    color: red\n}\n```"
        );
    }

    #[test]
    fn test_text_buffer_clamps_to_char_boundary() {
        let buffer = TextBuffer::new("é").with_cursor(1);
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn test_file_draft_store() {
        let dir = std::env::temp_dir().join(format!("wxmd-drafts-{}", std::process::id()));
        let mut store = FileDraftStore::new(&dir);
        store.set(LAST_CONTENT_KEY, "# draft");
        assert_eq!(store.get(LAST_CONTENT_KEY).as_deref(), Some("# draft"));
        assert!(store.path_for("a/b").ends_with("a_b.md"));
        let _ = fs::remove_dir_all(&dir);
    }
}
