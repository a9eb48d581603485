//! Documentation export: clean the generated text, lay it out as a typst
//! document (bold title line, bold section headings, fixed leading, pages
//! breaking when vertical space runs out), compile to PDF, write to disk.

mod world;

use std::fmt;
use std::fs;
use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;

/// Typed error for document export.
#[derive(Debug)]
pub enum ExportError {
    /// Typst compilation failed
    Compile(String),
    /// PDF encoding failed
    Pdf(String),
    /// Could not write the artifact
    Io(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Compile(msg) => write!(f, "Export compile error: {}", msg),
            ExportError::Pdf(msg) => write!(f, "Export PDF error: {}", msg),
            ExportError::Io(msg) => write!(f, "Export write error: {}", msg),
        }
    }
}

impl std::error::Error for ExportError {}

lazy_static! {
    static ref HEADING_MARKERS: Regex = Regex::new(r"(?m)^#+").expect("valid regex");
}

/// Strip markdown heading and emphasis markers: leading `#` runs go, every
/// `*` goes, and the result is trimmed.
pub fn clean_markdown(text: &str) -> String {
    let without_headings = HEADING_MARKERS.replace_all(text, "");
    without_headings.replace('*', "").trim().to_string()
}

/// Whole-line, case-insensitive match against the section-title vocabulary.
pub fn is_section_title(line: &str, section_titles: &[String]) -> bool {
    let trimmed = line.trim();
    section_titles.iter().any(|t| trimmed.eq_ignore_ascii_case(t))
}

/// Escape characters that carry markup meaning in typst source.
fn escape_typst(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        if matches!(c, '\\' | '#' | '*' | '_' | '$' | '&' | '@' | '~' | '^' | '`' | '"' | '<' | '>' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Lay cleaned text out as typst source: the first line is a bold heading,
/// recognized section titles are bold and larger, everything else runs at
/// body size with fixed leading. Page breaks are automatic.
pub fn build_typst_source(cleaned: &str, section_titles: &[String]) -> String {
    let mut source = String::from(
        "#set page(paper: \"a4\", margin: 2cm)\n#set text(size: 12pt)\n#set par(leading: 0.65em)\n\n",
    );

    let mut lines = cleaned.lines();
    if let Some(first) = lines.next() {
        source.push_str(&format!("#text(size: 14pt, weight: \"bold\")[{}]\n\n", escape_typst(first)));
    }
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            source.push('\n');
        } else if is_section_title(trimmed, section_titles) {
            source.push_str(&format!("#text(size: 14pt, weight: \"bold\")[{}]\n\n", escape_typst(trimmed)));
        } else {
            source.push_str(&escape_typst(line));
            source.push_str("\n\n");
        }
    }
    source
}

/// Export the generated documentation for `repo_name`.
///
/// Empty cleaned text produces no artifact and no file write; otherwise the
/// PDF lands as `<repo>_documentation.pdf` in the working directory and its
/// path is returned.
pub fn export_documentation(
    repo_name: &str,
    raw: &str,
    section_titles: &[String],
) -> Result<Option<PathBuf>, ExportError> {
    let cleaned = clean_markdown(raw);
    if cleaned.is_empty() {
        return Ok(None);
    }

    let source = build_typst_source(&cleaned, section_titles);
    let pdf = world::compile(&source)?;

    let path = PathBuf::from(format!("{}_documentation.pdf", repo_name));
    fs::write(&path, &pdf).map_err(|e| ExportError::Io(e.to_string()))?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<String> {
        vec!["README.md".to_string(), "Project Overview".to_string(), "Usage".to_string()]
    }

    #[test]
    fn clean_markdown_strips_headings_and_emphasis() {
        let raw = "# Title\n\n## Section\nSome **bold** and *italic* text.\n";
        let cleaned = clean_markdown(raw);
        assert_eq!(cleaned, "Title\n\n Section\nSome bold and italic text.");
    }

    #[test]
    fn clean_markdown_keeps_inline_hashes() {
        assert_eq!(clean_markdown("issue #42"), "issue #42");
    }

    #[test]
    fn empty_input_cleans_to_empty() {
        assert_eq!(clean_markdown(""), "");
        assert_eq!(clean_markdown("***"), "");
        assert_eq!(clean_markdown("###\n"), "");
    }

    #[test]
    fn section_titles_match_case_insensitively_whole_line() {
        let vocab = vocab();
        assert!(is_section_title("usage", &vocab));
        assert!(is_section_title("  PROJECT OVERVIEW  ", &vocab));
        assert!(!is_section_title("Usage notes", &vocab));
        assert!(!is_section_title("", &vocab));
    }

    #[test]
    fn typst_source_bolds_first_line_and_sections() {
        let cleaned = "My Repo Documentation\nIntro paragraph.\nUsage\nRun it.";
        let source = build_typst_source(cleaned, &vocab());
        assert!(source.contains("#text(size: 14pt, weight: \"bold\")[My Repo Documentation]"));
        assert!(source.contains("#text(size: 14pt, weight: \"bold\")[Usage]"));
        assert!(source.contains("Intro paragraph.\n\n"));
        assert!(source.starts_with("#set page("));
    }

    #[test]
    fn typst_escaping_neutralizes_markup() {
        assert_eq!(escape_typst("a #heading [x] @ref"), "a \\#heading \\[x\\] \\@ref");
        assert_eq!(escape_typst("plain text."), "plain text.");
    }

    #[test]
    fn empty_documentation_produces_no_artifact() {
        let result = export_documentation("demo", "  \n\n", &vocab()).unwrap();
        assert!(result.is_none());
        assert!(!std::path::Path::new("demo_documentation.pdf").exists());
    }
}
