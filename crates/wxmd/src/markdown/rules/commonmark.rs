//! CommonMark rules for HTML to Markdown conversion.

use once_cell::sync::Lazy;
use regex::Regex;
use wxmd_dom::NodeRef;

use super::{Filter, Rule};
use crate::language::{Language, LANGUAGE_PREFIX, LANG_PREFIX};
use crate::markdown::utilities::{clean_attribute, repeat};
use crate::markdown::HeadingStyle;

static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid blank line pattern"));

/// Create all CommonMark rules
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        fenced_code_block_rule(),
        horizontal_rule(),
        inline_link_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        image_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| format!("\n\n{}\n\n", content.trim()))
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, _| "  \n".to_string())
}

fn heading_rule() -> Rule {
    Rule::new(
        Filter::tags(&["h1", "h2", "h3", "h4", "h5", "h6"]),
        |node, content, options| {
            let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

            let content = content.trim();
            if content.is_empty() {
                return String::new();
            }

            match options.heading_style {
                HeadingStyle::Setext if level <= 2 => {
                    let underline = if level == 1 { "=" } else { "-" };
                    format!(
                        "\n\n{}\n{}\n\n",
                        content,
                        repeat(underline, content.chars().count())
                    )
                }
                _ => format!("\n\n{} {}\n\n", repeat("#", level), content),
            }
        },
    )
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let content = BLANK_RUNS.replace_all(content.trim(), "\n\n");
        if content.is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = content
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::new(Filter::tags(&["ul", "ol"]), |node, content, _| {
        let content = content.trim_end();

        // Nested lists don't get surrounding blank lines
        if node.parent_tag() == Some("li") {
            format!("\n{}", content)
        } else {
            format!("\n\n{}\n\n", content)
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |node, content, options| {
        let content = BLANK_RUNS
            .replace_all(content.trim_matches('\n').trim_start(), "\n\n")
            .replace('\n', "\n    "); // Indent continuation lines

        let prefix = match node.parent() {
            Some(parent) if parent.tag_name() == "ol" => {
                let start: usize = parent
                    .attr("start")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(1);
                // `start` comes from pasted markup and may be anything
                let number = format!("{}.", start.saturating_add(node.element_index()));
                format!("{:<width$}", number, width = number.len().max(3) + 1)
            }
            _ => format!("{}   ", options.bullet_list_marker),
        };

        format!("{}{}\n", prefix, content.trim_end())
    })
}

/// Language of a `pre > code` block in generic engine output
fn code_language(code: &NodeRef) -> Language {
    Language::from_class(code.attr("class").unwrap_or(""), &[LANGUAGE_PREFIX, LANG_PREFIX])
}

fn fenced_code_block_rule() -> Rule {
    Rule::new(
        Filter::tag("pre").when(|node, _| node.element_children().any(|c| c.tag_name() == "code")),
        |node, _, options| {
            let Some(code) = node.element_children().find(|c| c.tag_name() == "code") else {
                return String::new();
            };

            let fence = &options.fence;
            format!(
                "\n\n{}{}\n{}\n{}\n\n",
                fence,
                code_language(&code),
                code.text_content().trim_end(),
                fence
            )
        },
    )
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, options| format!("\n\n{}\n\n", options.hr))
}

fn inline_link_rule() -> Rule {
    Rule::new(
        Filter::tag("a").with_attr("href"),
        |node, content, _| {
            let href = clean_attribute(node.attr("href"));
            let title = node.attr("title").map(str::trim).filter(|t| !t.is_empty());

            if href.is_empty() && title.is_none() {
                return content.to_string();
            }

            let title_part = title
                .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
                .unwrap_or_default();

            format!("[{}]({}{})", content, href, title_part)
        },
    )
}

fn emphasis_rule() -> Rule {
    Rule::new(Filter::tags(&["em", "i"]), |_, content, options| {
        if content.trim().is_empty() {
            return String::new();
        }
        let delimiter = options.em_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn strong_rule() -> Rule {
    Rule::new(Filter::tags(&["strong", "b"]), |_, content, options| {
        if content.trim().is_empty() {
            return String::new();
        }
        let delimiter = &options.strong_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn code_rule() -> Rule {
    Rule::new(
        Filter::tag("code").outside("pre"),
        |node, _, _| {
            let content = node.text_content();
            if content.is_empty() {
                return String::new();
            }

            // Count backticks needed
            let max_consecutive_backticks = content
                .chars()
                .fold((0, 0), |(max, current), c| {
                    if c == '`' {
                        (max.max(current + 1), current + 1)
                    } else {
                        (max, 0)
                    }
                })
                .0;

            let backticks = "`".repeat(max_consecutive_backticks + 1);

            if content.starts_with('`') || content.ends_with('`') {
                format!("{} {} {}", backticks, content, backticks)
            } else {
                format!("{}{}{}", backticks, content, backticks)
            }
        },
    )
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, _| {
        let alt = clean_attribute(node.attr("alt"));
        let src = clean_attribute(node.attr("src"));
        let title = node.attr("title").map(str::trim).filter(|t| !t.is_empty());

        if src.is_empty() {
            return String::new();
        }

        let title_part = title.map(|t| format!(" \"{}\"", t)).unwrap_or_default();

        format!("![{}]({}{})", alt, src, title_part)
    })
}
