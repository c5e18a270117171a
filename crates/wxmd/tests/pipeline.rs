//! End-to-end behavior of the forward and reverse pipelines.

use wxmd::highlight::PlainHighlighter;
use wxmd::{
    clipboard_html_to_markdown, ClipboardPayload, CmarkRenderer, EditorSession, MarkdownGenerator,
    MemoryDraftStore, Proofer, TextBuffer,
};

fn plain_session() -> EditorSession {
    EditorSession::with_parts(
        CmarkRenderer::with_highlighter(Box::new(PlainHighlighter)),
        MemoryDraftStore::new(),
    )
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn proofed_blocks_carry_language_class() {
    for language in ["js", "css", "rust", "x-y"] {
        let html = format!(r#"<pre><code class="hljs lang-{}">a</code></pre>"#, language);
        let proofed = Proofer::new().proof(&html);
        assert!(
            proofed.contains(&format!(r#"<pre class="language-{}">"#, language)),
            "{}",
            proofed
        );
    }
}

#[test]
fn paragraph_count_equals_line_count() {
    let blocks = [
        "a",
        "a\nb",
        "a\n\nb",
        "  a\n\n\n    b\nc",
        "<span class=\"c\">/* a\nb */</span>\nx",
    ];
    for block in blocks {
        let lines = block.split('\n').count();

        let proofed = Proofer::new().proof(&format!("<pre><code>{}</code></pre>", block));
        assert_eq!(count(&proofed, "<p "), lines, "{}", proofed);

        let proofed = Proofer::new().proof(&format!("<blockquote><p>{}</p></blockquote>", block));
        assert_eq!(count(&proofed, "<p>"), lines, "{}", proofed);
    }
}

#[test]
fn blank_lines_become_break_paragraphs() {
    let proofed = Proofer::new().proof("<pre><code>a\n\n\nb</code></pre>");
    assert_eq!(count(&proofed, r#"<p class="lbr"><br></p>"#), 2);

    let proofed = Proofer::new().proof("<blockquote>a\n\nb</blockquote>");
    assert_eq!(
        proofed,
        r#"<blockquote class="blockquote"><p>a</p><p><br></p><p>b</p></blockquote>"#
    );
}

#[test]
fn leading_whitespace_becomes_nbsp() {
    for n in 0..6 {
        let line = format!("{}x", " ".repeat(n));
        let proofed = Proofer::new().proof(&format!("<pre><code>y\n{}</code></pre>", line));
        let expected = format!(r#"<p class="line">{}x</p>"#, "&nbsp;".repeat(n));
        assert!(proofed.contains(&expected), "{}", proofed);
    }
}

#[test]
fn quote_lines_keep_images() {
    let proofed = Proofer::new().proof(r#"<blockquote><p><img src="a.png"></p></blockquote>"#);
    assert_eq!(
        proofed,
        r#"<blockquote class="blockquote"><p class="img-wrap"><img src="a.png"></p></blockquote>"#
    );

    let proofed = Proofer::new().proof("<blockquote><p>text\n<img src=\"a.png\">\nmore</p></blockquote>");
    assert_eq!(
        proofed,
        concat!(
            r#"<blockquote class="blockquote"><p>text</p>"#,
            r#"<p class="img-wrap"><img src="a.png"></p><p>more</p></blockquote>"#
        )
    );
}

#[test]
fn markup_only_lines() {
    let proofed = Proofer::new().proof("<blockquote><p>a<br><br>b</p></blockquote>");
    assert_eq!(
        proofed,
        r#"<blockquote class="blockquote"><p>a</p><p><br></p><p>b</p></blockquote>"#
    );

    let proofed = Proofer::new().proof(r#"<pre><code><span class="c">/* a

b */</span></code></pre>"#);
    assert_eq!(count(&proofed, r#"<p class="lbr"><br></p>"#), 1, "{}", proofed);
    assert_eq!(count(&proofed, "<p "), 3, "{}", proofed);
}

#[test]
fn pasted_ordered_list_with_huge_start() {
    let html = format!(r#"<ol start="{}"><li>a</li><li>b</li></ol>"#, usize::MAX);
    assert_eq!(clipboard_html_to_markdown(&html), format!("{0}. a\n{0}. b", usize::MAX));
}

#[test]
fn image_dimensions_move_into_style() {
    let proofed = Proofer::new().proof(r#"<p><img src="a.png" width="120" height="80"></p>"#);
    assert!(proofed.contains(r#"style="width:120px;height:80px""#));
    assert!(!proofed.contains("width=\""));
    assert!(!proofed.contains("height=\""));
}

#[test]
fn js_code_block_example() {
    let session = plain_session();
    let html = session.preview_html("```js\nx = 1\n```\n");
    assert_eq!(
        html,
        concat!(
            r#"<blockquote class="code-wrap"><pre class="language-js">"#,
            r#"<p class="line">x = 1</p>"#,
            "</pre></blockquote>\n"
        )
    );
}

#[test]
fn pasted_code_block_is_beautified() {
    assert_eq!(
        clipboard_html_to_markdown(r#"<pre><code class="lang-js">var a=1;</code></pre>"#),
        "```js\nvar a = 1;\n```"
    );
}

#[test]
fn anchors_become_link_spans() {
    assert_eq!(Proofer::new().proof(r#"<a href="x">hi</a>"#), r#"<span class="link">hi</span>"#);
}

#[test]
fn language_round_trip() {
    let session = plain_session();
    for language in ["js", "python", "go"] {
        let markdown = format!("```{}\nprint(1)\n\n    indented\n```\n", language);
        let proofed = session.preview_html(&markdown);
        let regenerated = session.generate_markdown_from_clipboard_html(&proofed);
        let expected_fence = format!("```{}\n", language);
        assert!(regenerated.starts_with(&expected_fence), "{}", regenerated);
        if language != "js" {
            assert_eq!(regenerated, format!("```{}\nprint(1)\n\n    indented\n```", language));
        }
    }
}

#[test]
fn article_round_trip() {
    let session = plain_session();
    let markdown = "# Title\n\nSome *text* with `code` and [a link](https://example.com).\n\n> quoted\n\n- one\n- two\n";
    let proofed = session.preview_html(markdown);
    assert!(proofed.contains(r#"<span class="code">code</span>"#));
    assert!(proofed.contains(r#"<span class="link">a link</span>"#));

    let regenerated = session.generate_markdown_from_clipboard_html(&proofed);
    assert_eq!(
        regenerated,
        "# Title\n\nSome _text_ with code and a link.\n\n> quoted\n\n-   one\n-   two"
    );
}

#[test]
fn paste_into_buffer() {
    let session = plain_session();
    let mut editor = TextBuffer::new("before\n\nafter").with_cursor(8);
    session.handle_paste(
        &ClipboardPayload::new(r#"<p style="color:red">pasted <b>bold</b></p>"#, "pasted bold"),
        &mut editor,
    );
    assert_eq!(editor.text(), "before\n\npasted **bold**after");
}

#[test]
fn generator_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MarkdownGenerator>();
    assert_send_sync::<Proofer>();
}
