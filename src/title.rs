//! Derivation of a note's display title from its content.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Titles are cut to this many characters.
pub const TITLE_MAX_CHARS: usize = 30;

/// How titles are derived from the first line of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitlePolicy {
    /// Remove heading markers, emphasis/code markers and link syntax.
    pub strip_markdown: bool,
}

impl Default for TitlePolicy {
    fn default() -> Self {
        Self {
            strip_markdown: true,
        }
    }
}

impl TitlePolicy {
    /// Only trim and truncate the first line.
    pub fn plain() -> Self {
        Self {
            strip_markdown: false,
        }
    }
}

/// Placeholder title for a note without usable text.
pub fn placeholder_title(n: usize) -> String {
    format!("Note {}", n)
}

/// Derive a title from `content`.
///
/// `position` feeds the `Note {n}` placeholder used when the first line is
/// empty after stripping; callers pass the collection size.
pub fn derive_title(content: &str, policy: TitlePolicy, position: usize) -> String {
    let first_line = content.lines().next().unwrap_or("");

    let text = if policy.strip_markdown {
        strip_markdown(first_line)
    } else {
        first_line.to_string()
    };

    let title: String = text.trim().chars().take(TITLE_MAX_CHARS).collect();
    if title.is_empty() {
        placeholder_title(position)
    } else {
        title
    }
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*#+\s+").expect("valid heading pattern"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid link pattern"))
}

fn underscore_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(^|[^\w])_([^_]+)_([^\w]|$)").expect("valid emphasis pattern")
    })
}

/// Strip inline markdown from a single line.
fn strip_markdown(line: &str) -> String {
    let text = heading_re().replace(line, "");
    let text = link_re().replace_all(&text, "$1");
    let text = text
        .replace("**", "")
        .replace("__", "")
        .replace("~~", "")
        .replace(['*', '`'], "");
    strip_underscore_emphasis(text)
}

/// Each match consumes the delimiter after the span, so an adjacent span
/// like `_a_ _b_` needs another pass. Every pass drops two underscores.
fn strip_underscore_emphasis(mut text: String) -> String {
    loop {
        let next = underscore_re().replace_all(&text, "$1$2$3");
        if next == text {
            return text;
        }
        text = next.into_owned();
    }
}
