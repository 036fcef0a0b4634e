//! Language-independent text measurements.
//!
//! Indentation and line-length statistics are taken from raw lines. The
//! string scanner is shared by the heuristic (regex) extractors.

use std::path::Path;

use super::facts::{FileFeatures, IdentifierKind, IndentationTally, LineStats, QuoteTally};
use super::walker::is_test_path;

/// Start a feature bag with the measurements every extractor shares:
/// line counts, indentation, test-file flag and the file-name identifier.
pub fn base_features(path: &Path, language: &str, source: &str) -> FileFeatures {
    let mut features = FileFeatures::empty(&path.to_string_lossy(), language);
    features.total_lines = source.lines().count();
    features.is_test_file = is_test_path(path);
    features.indentation = indentation(source);
    features.line_stats = line_stats(source);

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let stem = name.split('.').next().unwrap_or("");
    // Dunder files (`__init__.py`) carry no naming signal.
    if !stem.starts_with("__") {
        features.identifiers.push(IdentifierKind::File, stem);
    }
    features
}

/// Classify the body of a doc comment by the section markers it uses.
pub fn classify_doc_format(text: &str) -> &'static str {
    if text.contains("Parameters\n") && text.contains("----") {
        "numpy"
    } else if [":param", ":return", ":rtype", ":raises"]
        .iter()
        .any(|m| text.contains(m))
    {
        "sphinx"
    } else if ["Args:", "Returns:", "Raises:", "Yields:"]
        .iter()
        .any(|m| text.contains(m))
    {
        "google"
    } else if ["@param", "@returns", "@return", "@throws"]
        .iter()
        .any(|m| text.contains(m))
    {
        "jsdoc"
    } else {
        "plain"
    }
}

/// Tally leading whitespace and indentation steps.
///
/// A step is recorded each time a space-indented line is indented deeper than
/// the previous non-blank line, so hanging continuation indents add noise but
/// block structure dominates.
pub fn indentation(source: &str) -> IndentationTally {
    let mut tally = IndentationTally::default();
    let mut previous_width = 0usize;

    for line in source.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let leading: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        let width = leading.chars().count();

        match leading.chars().next() {
            Some(' ') => {
                tally.space_lines += 1;
                if width > previous_width {
                    tally.steps.add(&(width - previous_width).to_string());
                }
            }
            Some('\t') => tally.tab_lines += 1,
            _ => {}
        }

        previous_width = if leading.starts_with('\t') { 0 } else { width };
    }

    tally
}

/// Length statistics over non-blank lines (in characters).
pub fn line_stats(source: &str) -> LineStats {
    let mut stats = LineStats::default();
    for line in source.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            continue;
        }
        let len = trimmed.chars().count();
        stats.lines += 1;
        stats.total_length += len;
        stats.max_length = stats.max_length.max(len);
    }
    stats
}

/// Result of scanning one line of C-family source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedLine {
    /// The line with string contents blanked and any `//` comment removed.
    pub code: String,
    /// String literals opened on this line.
    pub quotes: QuoteTally,
    /// Whether the line ends inside a template literal.
    pub open_template: bool,
}

/// Scan a line of JavaScript-like source.
///
/// Blanks the contents of string literals (so keywords and braces inside
/// strings are not counted), strips a trailing `//` comment, and counts the
/// quote character used to open each literal. Backtick templates are blanked
/// but not counted. `in_template` carries a template literal across lines.
///
/// Regex literals are not recognised; a quote inside one is counted as a
/// string opener. This is accepted as heuristic noise.
pub fn scan_line(line: &str, in_template: bool) -> ScannedLine {
    let mut out = ScannedLine::default();
    let mut string_char: Option<char> = if in_template { Some('`') } else { None };
    let mut escaped = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(quote) = string_char {
            if escaped {
                escaped = false;
                out.code.push(' ');
                continue;
            }
            if ch == '\\' {
                escaped = true;
                out.code.push(' ');
                continue;
            }
            if ch == quote {
                string_char = None;
                out.code.push(ch);
            } else {
                out.code.push(' ');
            }
            continue;
        }

        match ch {
            '/' if chars.peek() == Some(&'/') => break,
            '\'' | '"' | '`' => {
                match ch {
                    '\'' => out.quotes.single += 1,
                    '"' => out.quotes.double += 1,
                    _ => {}
                }
                string_char = Some(ch);
                out.code.push(ch);
            }
            _ => out.code.push(ch),
        }
    }

    // Unterminated single/double quoted strings end at the line break.
    out.open_template = string_char == Some('`');
    out
}

/// Net brace depth change of already-scanned code: (opens, closes).
pub fn brace_counts(code: &str) -> (usize, usize) {
    let opens = code.chars().filter(|c| *c == '{').count();
    let closes = code.chars().filter(|c| *c == '}').count();
    (opens, closes)
}
