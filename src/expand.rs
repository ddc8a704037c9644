use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::Error;
use crate::resolver;
use crate::scanner;
use crate::types::Expansion;

/// Depth-first expander for `\input`/`\include` trees.
///
/// All traversal state lives here and is dropped with the expander, so each
/// run starts clean. The active chain tracks the path from the root to the
/// file currently being expanded; a file may appear in several branches
/// (diamond inclusion) but never twice in the chain.
pub struct Expander {
    /// Chain of files currently being expanded, root first.
    active: Vec<PathBuf>,
    /// Directory searched after the including file's own directory.
    bib_dir: Option<PathBuf>,
    /// Compiled directive pattern, shared across the traversal.
    pattern: Regex,
    /// Every file entered at least once, canonicalized, for the cleanup pass.
    seen: BTreeSet<PathBuf>,
}

impl Expander {
    /// # Panics
    ///
    /// Panics if the hardcoded directive regex is invalid (compile-time
    /// invariant).
    pub fn new(bib_dir: Option<PathBuf>) -> Self {
        Self {
            active: Vec::new(),
            bib_dir,
            pattern: Regex::new(scanner::DIRECTIVE_PATTERN).expect("valid regex"),
            seen: BTreeSet::new(),
        }
    }

    /// Expand the tree rooted at `root` into a single buffer.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileRead` when a file cannot be read,
    /// `Error::UnresolvedInclude` when a directive matches no file, and
    /// `Error::IncludeCycle` when a file includes itself through any chain.
    pub fn expand(mut self, root: &Path) -> Result<Expansion, Error> {
        let text = self.expand_file(root)?;
        Ok(Expansion {
            seen: self.seen,
            text,
        })
    }

    /// Read one file and expand it line by line. Comments are stripped from
    /// each physical line before directives are looked for, so a
    /// commented-out `\input` is never followed. Line terminators are
    /// re-emitted as `\n`; a final line without one stays without one.
    fn expand_file(&mut self, path: &Path) -> Result<String, Error> {
        let canonical = resolver::canonicalize(path)?;
        if self.active.contains(&canonical) {
            let mut chain = self.active.clone();
            chain.push(canonical);
            return Err(Error::IncludeCycle { chain });
        }

        let content = std::fs::read_to_string(&canonical).map_err(|source| Error::FileRead {
            path: canonical.clone(),
            source,
        })?;
        let base_dir = canonical
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        self.seen.insert(canonical.clone());
        self.active.push(canonical);

        let mut out = String::with_capacity(content.len());
        for raw in content.split_inclusive('\n') {
            let terminated = raw.ends_with('\n');
            let line = raw.strip_suffix('\n').unwrap_or(raw);
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.expand_line(scanner::strip_comment(line), &base_dir, &mut out)?;
            if terminated {
                out.push('\n');
            }
        }

        self.active.pop();
        Ok(out)
    }

    /// Splice one comment-stripped line into the output buffer: text before
    /// a directive, then the expanded target in place of the directive, then
    /// the rest of the line.
    fn expand_line(&mut self, line: &str, base_dir: &Path, out: &mut String) -> Result<(), Error> {
        let mut cursor = 0;
        for directive in scanner::directives(&self.pattern, line) {
            out.push_str(&line[cursor..directive.span.start]);
            let target =
                resolver::resolve_include(&directive.name, base_dir, self.bib_dir.as_deref())?;
            let expanded = self.expand_file(&target)?;
            out.push_str(&expanded);
            cursor = directive.span.end;
        }
        out.push_str(&line[cursor..]);
        Ok(())
    }
}

/// Collapse every run of three or more whitespace-only lines to exactly two
/// empty lines. Shorter runs are kept verbatim, whitespace included. The
/// presence or absence of the final newline is preserved.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut blank_run: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run.push(line);
        } else {
            flush_blank_run(&mut kept, &mut blank_run);
            kept.push(line);
        }
    }
    flush_blank_run(&mut kept, &mut blank_run);

    let mut out = kept.join("\n");
    if text.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Move a pending run of blank lines into the kept buffer, collapsing it
/// when it is long enough.
fn flush_blank_run<'a>(kept: &mut Vec<&'a str>, blank_run: &mut Vec<&'a str>) {
    if blank_run.len() >= 3 {
        kept.push("");
        kept.push("");
        blank_run.clear();
    } else {
        kept.append(blank_run);
    }
}
