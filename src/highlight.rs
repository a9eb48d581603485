//! Syntax highlighting for the read-only file view.

use std::sync::Mutex;

use lazy_static::lazy_static;
use ratatui::style::Color;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

lazy_static! {
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
    static ref THEME_SET: ThemeSet = ThemeSet::load_defaults();
    // Only one file is ever on display, so a single-entry cache suffices.
    static ref LAST: Mutex<Option<(String, Vec<Vec<(Color, String)>>)>> = Mutex::new(None);
}

/// Highlight a file's content into per-line `(color, text)` spans. Syntax is
/// resolved by file extension, defaulting to plain text.
pub fn highlight_file(path: &str, content: &str) -> Vec<Vec<(Color, String)>> {
    let cache_key = format!("{}:{}", path, content.len());
    if let Ok(cache) = LAST.lock()
        && let Some((key, lines)) = cache.as_ref()
        && *key == cache_key
    {
        return lines.clone();
    }

    let lines = do_highlight(path, content);
    if let Ok(mut cache) = LAST.lock() {
        *cache = Some((cache_key, lines.clone()));
    }
    lines
}

fn do_highlight(path: &str, content: &str) -> Vec<Vec<(Color, String)>> {
    let extension = std::path::Path::new(path).extension().and_then(|e| e.to_str()).unwrap_or("");
    let syntax = SYNTAX_SET
        .find_syntax_by_extension(extension)
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let theme = &THEME_SET.themes["base16-ocean.dark"];

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut result = Vec::new();
    for line in LinesWithEndings::from(content) {
        let ranges = highlighter.highlight_line(line, &SYNTAX_SET).unwrap_or_default();
        let spans: Vec<(Color, String)> = ranges
            .into_iter()
            .map(|(style, text)| {
                let fg = style.foreground;
                (Color::Rgb(fg.r, fg.g, fg.b), text.trim_end_matches('\n').to_string())
            })
            .collect();
        result.push(spans);
    }
    result
}
