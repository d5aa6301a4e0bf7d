//! Plain-text snippet extraction for preview cards.
//!
//! A lossy projection of note content: markup is stripped, lines are joined
//! with single spaces, and length is left to the caller.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Options that change the extraction output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Keep only the display text of `[[wiki]]` and `[text](url)` links.
    pub remove_link_brackets: bool,
}

const FENCE: &str = "---";

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex"))
}

fn inline_property_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^\s*[\w-]+::.*$")
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^\s*#+\s+")
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\*\*(.+?)\*\*")
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\*([^*\s](?:[^*]*[^*\s])?)\*")
}

fn quote_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^\s*(?:>\s*)+")
}

fn list_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^\s*(?:[-*+]|\d+[.)])\s+(?:\[[ xX]\]\s+)?")
}

fn pipe_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\[\[[^\]]*\]\]|\|")
}

fn wikilink_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"!?\[\[([^\]|]*)(?:\|([^\]]*))?\]\]")
}

fn mdlink_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"!?\[([^\]]*)\]\([^)]*\)")
}

/// Turn raw note content into a single-line preview snippet.
///
/// Returns an empty string when nothing but front matter or markup remains.
pub fn extract_preview(raw: &str, options: &ExtractOptions) -> String {
    let body = strip_front_matter(raw.trim());

    body.lines()
        .filter(|line| !inline_property_re().is_match(line))
        .filter(|line| !is_table_separator(line))
        .map(strip_markup)
        .map(|line| {
            if options.remove_link_brackets {
                strip_link_brackets(&line)
            } else {
                line
            }
        })
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop a leading `---` fenced block, only when it is closed.
fn strip_front_matter(text: &str) -> &str {
    let mut lines = text.split_inclusive('\n');
    let mut offset = match lines.next() {
        Some(first) if first.trim_end() == FENCE => first.len(),
        _ => return text,
    };
    for line in lines {
        offset += line.len();
        if line.trim_end() == FENCE {
            return &text[offset..];
        }
    }
    text
}

/// A markdown table separator row such as `|---|:--:|`.
///
/// A bare `---` rule has no pipe and is not a separator.
fn is_table_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed.contains('|')
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':') || c.is_whitespace())
}

fn strip_markup(line: &str) -> String {
    // Quote markers first so a quoted heading or list item is unwrapped too.
    let line = quote_re().replace(line, "");
    let line = heading_re().replace(&line, "");
    let line = list_re().replace(&line, "");
    let line = bold_re().replace_all(&line, "$1");
    let line = italic_re().replace_all(&line, "$1");
    // Pipes inside wikilinks are alias separators; leave them for the link step.
    pipe_re()
        .replace_all(&line, |caps: &Captures| {
            let m = &caps[0];
            if m == "|" {
                String::new()
            } else {
                m.to_string()
            }
        })
        .into_owned()
}

fn strip_link_brackets(line: &str) -> String {
    let line = wikilink_re().replace_all(line, |caps: &Captures| {
        caps.get(2)
            .map(|alias| alias.as_str())
            .unwrap_or(&caps[1])
            .to_string()
    });
    mdlink_re().replace_all(&line, "$1").into_owned()
}
