use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::resolver;
use crate::types::Directive;

/// Pattern for one inclusion directive: `\input{name}` or `\include{name}`.
/// The opening brace must follow the command word directly and the name may
/// not contain braces, so `\includegraphics{...}` never matches.
pub const DIRECTIVE_PATTERN: &str = r"\\(?:input|include)\{([^{}]+)\}";

/// Patterns for PDF asset references in a flattened document.
/// Case-insensitive; the first capture group is the referenced name.
const ASSET_PATTERNS: [&str; 4] = [
    r"(?i)\\includegraphics(?:\[[^\]]*\])?\{([^}]+)\}",
    r"(?i)\\includepdf(?:\[[^\]]*\])?\{([^}]+)\}",
    r"(?i)\\pdfximage\{([^}]+)\}",
    r"(?i)\\caption\{[^}]*?([A-Za-z0-9_\-]+\.pdf)",
];

/// Extract every inclusion directive from one comment-stripped line, in
/// left-to-right order. Braces holding only whitespace are not a directive.
pub fn directives(pattern: &Regex, line: &str) -> Vec<Directive> {
    let mut found = Vec::new();
    for cap in pattern.captures_iter(line) {
        let Some(whole) = cap.get(0) else { continue };
        let Some(name) = cap.get(1) else { continue };
        let trimmed = name.as_str().trim();
        if trimmed.is_empty() {
            continue;
        }
        found.push(Directive {
            name: trimmed.to_string(),
            span: whole.range(),
        });
    }
    found
}

/// Apply the asset extension rule to a raw reference: names without an
/// extension default to `.pdf`, names already ending in `.pdf` (any case)
/// pass through, and names carrying any other extension are dropped.
fn pdf_asset_name(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if Path::new(raw).extension().is_none() {
        return Some(format!("{raw}.pdf"));
    }
    if raw.to_ascii_lowercase().ends_with(".pdf") {
        return Some(raw.to_string());
    }
    None
}

/// Scan the flattened buffer for referenced PDF assets and resolve each
/// against the project root and the configured graphics directories.
/// References that resolve to no existing file are skipped, never an error.
///
/// # Panics
///
/// Panics if a hardcoded asset regex is invalid (compile-time invariant).
pub fn referenced_assets(text: &str, root: &Path, graphics_dirs: &[String]) -> BTreeSet<PathBuf> {
    let mut assets = BTreeSet::new();
    let patterns = ASSET_PATTERNS.map(|p| Regex::new(p).expect("valid regex"));

    for re in &patterns {
        for cap in re.captures_iter(text) {
            let Some(name) = cap.get(1) else { continue };
            let Some(pdf_name) = pdf_asset_name(name.as_str().trim()) else {
                continue;
            };
            if let Some(found) = resolver::resolve_asset(&pdf_name, root, graphics_dirs) {
                assets.insert(found);
            }
        }
    }

    assets
}

/// Strip the comment portion of one physical line.
///
/// An unescaped `%` starts the comment and is removed along with everything
/// after it. A `%` preceded by an odd number of backslashes is the `\%`
/// literal and stays. Text before the marker is returned untrimmed.
pub fn strip_comment(line: &str) -> &str {
    let mut odd_backslashes = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '\\' => odd_backslashes = !odd_backslashes,
            '%' if !odd_backslashes => return &line[..idx],
            _ => odd_backslashes = false,
        }
    }
    line
}
