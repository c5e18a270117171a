//! JavaScript re-indentation.
//!
//! A token-level formatter: one statement per line, braces indented by
//! [`INDENT`](super::INDENT), single spaces around binary operators and after
//! commas. Source blank lines between statements are kept (at most one).

use super::{BeautifyError, Beautifier, Printer};

/// Formatter for `js` / `javascript` code blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptBeautifier;

impl Beautifier for ScriptBeautifier {
    fn beautify(&self, source: &str) -> Result<String, BeautifyError> {
        let tokens = tokenize(source)?;
        Ok(format_tokens(&tokens))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Word,
    Str,
    Regex,
    LineComment,
    BlockComment,
    Punct,
    Open,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: Kind,
    text: &'a str,
    /// Line breaks in the whitespace before the token
    newlines: usize,
}

impl Token<'_> {
    fn is(&self, kind: Kind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    /// Whether the token ends an operand, so a following `/` divides
    fn ends_operand(&self) -> bool {
        match self.kind {
            Kind::Word => !OPERAND_KEYWORDS.contains(&self.text),
            Kind::Str | Kind::Regex => true,
            Kind::Close => true,
            Kind::Punct => matches!(self.text, "++" | "--"),
            _ => false,
        }
    }
}

/// Keywords after which an operand (not an operator) follows
const OPERAND_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "case", "in", "of", "delete", "void", "throw", "new",
    "yield", "await", "else", "do",
];

/// Keywords written with a space before their parenthesis
const PAREN_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "with"];

/// Keywords that continue the line after a closing brace
const BRACE_CONTINUATIONS: &[&str] = &["else", "catch", "finally", "while"];

const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "+", "-", "*", "/", "%", "=", "<", ">", "!", "~", "&", "|",
    "^", "?", ":", ";", ",", ".",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '#' || c == '@'
}

fn tokenize(source: &str) -> Result<Vec<Token<'_>>, BeautifyError> {
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut chars = source.char_indices().peekable();
    let mut newlines = 0;

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            if c == '\n' {
                newlines += 1;
            }
            chars.next();
            continue;
        }

        let rest = &source[start..];
        let operand_expected = tokens
            .iter()
            .rev()
            .find(|t| !matches!(t.kind, Kind::LineComment | Kind::BlockComment))
            .map_or(true, |t| !t.ends_operand());

        let (kind, len) = if rest.starts_with("//") {
            (Kind::LineComment, rest.find('\n').unwrap_or(rest.len()))
        } else if rest.starts_with("/*") {
            let end = rest[2..].find("*/").ok_or(BeautifyError::Unterminated {
                what: "comment",
                offset: start,
            })?;
            (Kind::BlockComment, end + 4)
        } else if c == '/' && operand_expected {
            (Kind::Regex, regex_len(rest, start)?)
        } else if matches!(c, '"' | '\'' | '`') {
            (Kind::Str, string_len(rest, c, start)?)
        } else if is_word_char(c) {
            let len = rest
                .char_indices()
                .find(|&(i, ch)| !(is_word_char(ch) || (ch == '.' && c.is_ascii_digit() && i > 0)))
                .map_or(rest.len(), |(i, _)| i);
            (Kind::Word, len)
        } else if matches!(c, '(' | '[' | '{') {
            open.push((c, start));
            (Kind::Open, 1)
        } else if matches!(c, ')' | ']' | '}') {
            let expected = match c {
                ')' => '(',
                ']' => '[',
                _ => '{',
            };
            match open.pop() {
                Some((opened, _)) if opened == expected => {}
                _ => return Err(BeautifyError::UnexpectedClose { found: c, offset: start }),
            }
            (Kind::Close, 1)
        } else {
            let len = PUNCTUATORS
                .iter()
                .find(|p| rest.starts_with(*p))
                .map_or(c.len_utf8(), |p| p.len());
            (Kind::Punct, len)
        };

        tokens.push(Token {
            kind,
            text: &rest[..len],
            newlines,
        });
        newlines = 0;
        while chars.peek().is_some_and(|&(i, _)| i < start + len) {
            chars.next();
        }
    }

    if let Some((open, offset)) = open.pop() {
        return Err(BeautifyError::Unbalanced { open, offset });
    }
    Ok(tokens)
}

/// Byte length of the string literal at the start of `rest`
fn string_len(rest: &str, quote: char, offset: usize) -> Result<usize, BeautifyError> {
    let mut escaped = false;
    for (i, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Ok(i + 1);
        } else if c == '\n' && quote != '`' {
            break;
        }
    }
    Err(BeautifyError::Unterminated {
        what: "string",
        offset,
    })
}

/// Byte length of the regular expression literal (with flags) at the start of `rest`
fn regex_len(rest: &str, offset: usize) -> Result<usize, BeautifyError> {
    let mut escaped = false;
    let mut in_class = false;
    for (i, c) in rest.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                let flags = rest[i + 1..]
                    .find(|ch: char| !ch.is_ascii_alphabetic())
                    .unwrap_or(rest.len() - i - 1);
                return Ok(i + 1 + flags);
            }
            '\n' => break,
            _ => {}
        }
    }
    Err(BeautifyError::Unterminated {
        what: "regular expression",
        offset,
    })
}

fn format_tokens(tokens: &[Token<'_>]) -> String {
    let mut printer = Printer::new();
    let mut paren_depth = 0usize;
    let mut ternary_depth = 0usize;
    let mut prev: Option<Token<'_>> = None;
    let mut after_brace = false;

    for (index, token) in tokens.iter().enumerate() {
        let next = tokens.get(index + 1);

        if after_brace {
            after_brace = false;
            let continues = matches!(token.kind, Kind::Close)
                || (token.kind == Kind::Punct && matches!(token.text, ";" | "," | "." | "?." | ":"))
                || (token.kind == Kind::Word && BRACE_CONTINUATIONS.contains(&token.text));
            if !continues {
                printer.newline();
            }
        }

        // Statement boundary without a semicolon
        if token.newlines > 0
            && paren_depth == 0
            && prev.is_some_and(|p| p.ends_operand())
            && matches!(token.kind, Kind::Word | Kind::Str)
            && !BRACE_CONTINUATIONS.contains(&token.text)
        {
            printer.newline();
        }
        if token.newlines > 1 && printer.is_line_start() {
            printer.blank_line();
        }

        match token.kind {
            Kind::LineComment => {
                if token.newlines > 0 {
                    printer.newline();
                }
                printer.space();
                printer.write(token.text);
                printer.newline();
                continue;
            }
            Kind::BlockComment => {
                if token.newlines > 0 {
                    printer.newline();
                }
                printer.space();
                printer.write(token.text);
                if next.is_some_and(|n| n.newlines > 0) {
                    printer.newline();
                } else {
                    printer.space();
                }
                continue;
            }
            Kind::Word | Kind::Str | Kind::Regex => {
                if prev.is_some_and(|p| matches!(p.kind, Kind::Word | Kind::Str | Kind::Regex) || p.is(Kind::Close, ")") || p.is(Kind::Close, "}")) {
                    printer.space();
                }
                printer.write(token.text);
            }
            Kind::Open => match token.text {
                "{" => {
                    printer.space();
                    printer.write("{");
                    printer.indent();
                    printer.newline();
                }
                "(" => {
                    match prev {
                        Some(p) if p.kind == Kind::Word && PAREN_KEYWORDS.contains(&p.text) => printer.space(),
                        Some(p) if p.kind == Kind::Word && OPERAND_KEYWORDS.contains(&p.text) => printer.space(),
                        Some(p) if p.ends_operand() => printer.clear_space(),
                        _ => {}
                    }
                    paren_depth += 1;
                    printer.write("(");
                }
                _ => {
                    if prev.is_some_and(|p| p.ends_operand()) {
                        printer.clear_space();
                    } else if prev.is_some_and(|p| p.kind == Kind::Word) {
                        printer.space();
                    }
                    printer.write(token.text);
                }
            },
            Kind::Close => match token.text {
                "}" => {
                    printer.dedent();
                    if prev.is_some_and(|p| p.is(Kind::Open, "{")) {
                        printer.join_line();
                    } else {
                        printer.newline();
                    }
                    printer.write("}");
                    after_brace = true;
                }
                _ => {
                    if token.text == ")" {
                        paren_depth = paren_depth.saturating_sub(1);
                    }
                    printer.clear_space();
                    printer.write(token.text);
                }
            },
            Kind::Punct => match token.text {
                "." | "?." => {
                    printer.clear_space();
                    printer.write(token.text);
                }
                "," => {
                    printer.clear_space();
                    printer.write(",");
                    printer.space();
                }
                ";" => {
                    printer.clear_space();
                    printer.write(";");
                    if paren_depth > 0 {
                        printer.space();
                    } else {
                        printer.newline();
                    }
                }
                "?" => {
                    ternary_depth += 1;
                    printer.space();
                    printer.write("?");
                    printer.space();
                }
                ":" if ternary_depth > 0 => {
                    ternary_depth -= 1;
                    printer.space();
                    printer.write(":");
                    printer.space();
                }
                ":" => {
                    printer.clear_space();
                    printer.write(":");
                    if next.is_some_and(|n| n.newlines == 0) {
                        printer.space();
                    }
                }
                "!" | "~" | "..." => {
                    if prev.is_some_and(|p| p.kind == Kind::Word) {
                        printer.space();
                    }
                    printer.write(token.text);
                }
                "++" | "--" => {
                    if prev.is_some_and(|p| p.ends_operand()) {
                        printer.clear_space();
                    } else if prev.is_some_and(|p| p.kind == Kind::Word) {
                        printer.space();
                    }
                    printer.write(token.text);
                }
                "+" | "-" if !prev.is_some_and(|p| p.ends_operand()) => {
                    // Unary sign
                    if prev.is_some_and(|p| p.kind == Kind::Word) {
                        printer.space();
                    }
                    printer.write(token.text);
                }
                _ => {
                    printer.space();
                    printer.write(token.text);
                    printer.space();
                }
            },
        }

        prev = Some(*token);
    }

    printer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beautify(source: &str) -> String {
        ScriptBeautifier.beautify(source).unwrap()
    }

    #[test]
    fn test_operator_spacing() {
        assert_eq!(beautify("var a=1;"), "var a = 1;");
        assert_eq!(beautify("x=a+b*-c"), "x = a + b * -c");
        assert_eq!(beautify("if(a===b&&!c){d()}"), "if (a === b && !c) {\n    d()\n}");
    }

    #[test]
    fn test_one_statement_per_line() {
        assert_eq!(beautify("var a=1;var b=2;"), "var a = 1;\nvar b = 2;");
        assert_eq!(beautify("a = 1\nb = 2"), "a = 1\nb = 2");
    }

    #[test]
    fn test_nested_blocks() {
        assert_eq!(
            beautify("function f(a,b){if(a){return b}else{return a}}"),
            "function f(a, b) {\n    if (a) {\n        return b\n    } else {\n        return a\n    }\n}"
        );
    }

    #[test]
    fn test_for_loop_keeps_header_on_one_line() {
        assert_eq!(
            beautify("for(var i=0;i<n;i++){sum+=i;}"),
            "for (var i = 0; i < n; i++) {\n    sum += i;\n}"
        );
    }

    #[test]
    fn test_strings_comments_and_regex() {
        assert_eq!(beautify("s='a;b{'+\"c\";"), "s = 'a;b{' + \"c\";");
        assert_eq!(beautify("// note\nx=1;"), "// note\nx = 1;");
        assert_eq!(beautify("r=/[/]+/g.test(s);"), "r = /[/]+/g.test(s);");
        assert_eq!(beautify("a=b/2;"), "a = b / 2;");
    }

    #[test]
    fn test_keeps_one_blank_line() {
        assert_eq!(beautify("a();\n\n\n\nb();"), "a();\n\nb();");
    }

    #[test]
    fn test_empty_block_and_object() {
        assert_eq!(beautify("function f(){}"), "function f() {}");
        assert_eq!(beautify("var o={a:1,b:[1,2]};"), "var o = {\n    a: 1, b: [1, 2]\n};");
    }

    #[test]
    fn test_idempotent() {
        let once = beautify("function f(a,b){if(a){return b}else{return a}}\n\n\nvar o={a:1};x=y?1:2;");
        assert_eq!(beautify(&once), once);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            ScriptBeautifier.beautify("f(a"),
            Err(BeautifyError::Unbalanced { open: '(', offset: 1 })
        );
        assert_eq!(
            ScriptBeautifier.beautify("a)"),
            Err(BeautifyError::UnexpectedClose { found: ')', offset: 1 })
        );
        assert!(matches!(
            ScriptBeautifier.beautify("s = 'abc"),
            Err(BeautifyError::Unterminated { what: "string", .. })
        ));
        assert!(matches!(
            ScriptBeautifier.beautify("/* open"),
            Err(BeautifyError::Unterminated { what: "comment", .. })
        ));
    }
}
