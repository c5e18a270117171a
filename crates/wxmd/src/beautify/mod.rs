//! Language-tagged code beautifiers.
//!
//! Pasted code blocks arrive with whatever layout the source page used; the
//! registry re-indents the languages it knows before the block is fenced.
//! Unknown languages pass through untouched.

mod markup;
mod script;
mod style;

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::language::Language;

pub use markup::MarkupBeautifier;
pub use script::ScriptBeautifier;
pub use style::StyleBeautifier;

/// Indentation unit written by the default beautifiers
pub const INDENT: &str = "    ";

/// Errors raised by a beautifier on input it cannot re-indent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BeautifyError {
    #[error("unbalanced {open:?} opened at offset {offset}")]
    Unbalanced { open: char, offset: usize },

    #[error("unterminated {what} starting at offset {offset}")]
    Unterminated { what: &'static str, offset: usize },

    #[error("unexpected {found:?} at offset {offset}")]
    UnexpectedClose { found: char, offset: usize },
}

/// Re-indents source code of one language
pub trait Beautifier: Send + Sync {
    fn beautify(&self, source: &str) -> Result<String, BeautifyError>;
}

impl<F> Beautifier for F
where
    F: Fn(&str) -> Result<String, BeautifyError> + Send + Sync,
{
    fn beautify(&self, source: &str) -> Result<String, BeautifyError> {
        self(source)
    }
}

/// Beautifiers keyed by language id
#[derive(Clone)]
pub struct BeautifierRegistry {
    beautifiers: IndexMap<String, Arc<dyn Beautifier>>,
}

impl BeautifierRegistry {
    /// Registry with `js`/`javascript`, `css` and `html` beautifiers
    pub fn new() -> Self {
        let mut registry = Self::empty();
        let script: Arc<dyn Beautifier> = Arc::new(ScriptBeautifier);
        registry.register_shared("js", script.clone());
        registry.register_shared("javascript", script);
        registry.register("css", StyleBeautifier);
        registry.register("html", MarkupBeautifier);
        registry
    }

    /// Registry without any beautifier; every language passes through
    pub fn empty() -> Self {
        Self {
            beautifiers: IndexMap::new(),
        }
    }

    /// Register a beautifier for a language id, replacing any previous one
    pub fn register<B>(&mut self, id: &str, beautifier: B) -> &mut Self
    where
        B: Beautifier + 'static,
    {
        self.register_shared(id, Arc::new(beautifier))
    }

    pub fn register_shared(&mut self, id: &str, beautifier: Arc<dyn Beautifier>) -> &mut Self {
        self.beautifiers.insert(id.to_lowercase(), beautifier);
        self
    }

    pub fn get(&self, id: &str) -> Option<&dyn Beautifier> {
        self.beautifiers.get(&id.to_lowercase()).map(|b| b.as_ref())
    }

    /// Registered language ids, in registration order
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.beautifiers.keys().map(String::as_str)
    }

    /// Beautify `source` for `language`. `Ok(None)` when no beautifier is
    /// registered for it.
    pub fn beautify(&self, language: &Language, source: &str) -> Result<Option<String>, BeautifyError> {
        match language.id().and_then(|id| self.get(id)) {
            Some(beautifier) => beautifier.beautify(source).map(Some),
            None => Ok(None),
        }
    }

    /// Beautify `source`, falling back to the raw text when the language is
    /// unknown or the beautifier fails.
    pub fn beautify_or_raw(&self, language: &Language, source: &str) -> String {
        match self.beautify(language, source) {
            Ok(Some(formatted)) => formatted,
            Ok(None) => {
                debug!(language = %language, "no beautifier registered, passing through");
                source.to_string()
            }
            Err(err) => {
                warn!(language = %language, error = %err, "beautifier failed, keeping raw text");
                source.to_string()
            }
        }
    }
}

impl Default for BeautifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Line-oriented output buffer shared by the beautifiers
#[derive(Debug, Default)]
pub(crate) struct Printer {
    out: String,
    indent: usize,
    line_start: bool,
    pending_space: bool,
}

impl Printer {
    pub(crate) fn new() -> Self {
        Self {
            line_start: true,
            ..Self::default()
        }
    }

    pub(crate) fn indent(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub(crate) fn is_line_start(&self) -> bool {
        self.line_start
    }

    /// Request a single space before the next write on this line
    pub(crate) fn space(&mut self) {
        self.pending_space = true;
    }

    pub(crate) fn clear_space(&mut self) {
        self.pending_space = false;
    }

    pub(crate) fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if self.line_start {
            for _ in 0..self.indent {
                self.out.push_str(INDENT);
            }
            self.line_start = false;
        } else if self.pending_space && !self.out.ends_with(' ') {
            self.out.push(' ');
        }
        self.pending_space = false;
        self.out.push_str(s);
    }

    pub(crate) fn newline(&mut self) {
        self.pending_space = false;
        if self.line_start {
            return;
        }
        self.out.truncate(self.out.trim_end_matches(' ').len());
        self.out.push('\n');
        self.line_start = true;
    }

    /// End the line and leave one empty line, unless at the very start
    pub(crate) fn blank_line(&mut self) {
        self.newline();
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    /// Undo a trailing line break so the next write continues the line
    pub(crate) fn join_line(&mut self) {
        if self.line_start && self.out.ends_with('\n') {
            self.out.pop();
            self.line_start = false;
        }
    }

    pub(crate) fn finish(self) -> String {
        self.out.trim_end().to_string()
    }
}
