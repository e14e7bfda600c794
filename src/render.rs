//! Markdown preview rendering.

use pulldown_cmark::{html, Event, Options, Parser};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Render single newlines as line breaks.
    pub line_breaks: bool,
    /// Pass raw HTML through instead of escaping it.
    pub allow_html: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            line_breaks: true,
            allow_html: false,
        }
    }
}

/// Render markdown to an HTML fragment.
pub fn render_markdown(source: &str, options: RenderOptions) -> String {
    let mut parser_options = Options::empty();
    parser_options.insert(Options::ENABLE_TABLES);
    parser_options.insert(Options::ENABLE_STRIKETHROUGH);
    parser_options.insert(Options::ENABLE_TASKLISTS);

    let events = Parser::new_ext(source, parser_options).map(|event| match event {
        Event::SoftBreak if options.line_breaks => Event::HardBreak,
        Event::Html(raw) if !options.allow_html => Event::Text(raw),
        Event::InlineHtml(raw) if !options.allow_html => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

/// Render markdown with default options.
pub fn render(source: &str) -> String {
    render_markdown(source, RenderOptions::default())
}
