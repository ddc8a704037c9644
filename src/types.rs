/// Core domain types for texflat directives, traversal output, and reports.
use std::collections::BTreeSet;
use std::ops::Range;
use std::path::PathBuf;

/// A single deletion that could not be carried out.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeletionFailure {
    /// Path that could not be deleted.
    pub path: PathBuf,
    /// Description of the failure.
    pub reason: String,
}

/// Outcome of one best-effort deletion pass.
#[derive(Debug, serde::Serialize)]
pub struct DeletionReport {
    /// Paths that were removed.
    pub deleted: Vec<PathBuf>,
    /// Deletions that failed, in candidate order.
    pub failed: Vec<DeletionFailure>,
}

/// An inclusion directive located on a single comment-stripped line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Target name inside the braces, whitespace-trimmed, no extension implied.
    pub name: String,
    /// Byte span of the full `\input{...}` text within its line.
    pub span: Range<usize>,
}

/// Everything one traversal produces: the flattened text plus the seen-ever
/// set used for cleanup accounting.
#[derive(Debug)]
pub struct Expansion {
    /// Canonical path of every file read during the traversal, root included.
    pub seen: BTreeSet<PathBuf>,
    /// The flattened, comment-stripped document text.
    pub text: String,
}

/// Machine-readable summary of one run, printed by `--json`.
#[derive(Debug, serde::Serialize)]
pub struct RunReport {
    /// Canonical paths of every file inlined into the output.
    pub inlined: Vec<PathBuf>,
    /// The input file as given on the command line.
    pub input: PathBuf,
    /// The output file as given on the command line.
    pub output: PathBuf,
    /// Outcome of `--delete-unused-pdf`, when requested.
    pub pdf_deletions: Option<DeletionReport>,
    /// Canonical paths of PDF assets referenced by the flattened document.
    pub referenced_pdfs: Vec<PathBuf>,
    /// Outcome of `--delete-tex`, when requested.
    pub tex_deletions: Option<DeletionReport>,
}
