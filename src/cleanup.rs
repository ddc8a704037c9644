//! Cleanup pass: discovery and best-effort deletion of flattened-away
//! `.tex` sources and unreferenced PDF assets.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::types::{DeletionFailure, DeletionReport};

/// Delete every candidate, continuing past failures. A candidate that is
/// already gone counts as neither deleted nor failed, so a re-run after a
/// partial failure converges instead of erroring.
pub fn delete_files(candidates: &[PathBuf]) -> DeletionReport {
    let mut deleted = Vec::new();
    let mut failed = Vec::new();

    for path in candidates {
        match std::fs::remove_file(path) {
            Ok(()) => deleted.push(path.clone()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => failed.push(DeletionFailure {
                path: path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    DeletionReport { deleted, failed }
}

/// Find every PDF file under the project root, canonicalized. Files that
/// vanish between discovery and canonicalization are skipped.
pub fn discover_pdfs(root: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "pdf"))
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.path().canonicalize().ok())
        .collect()
}

/// Render a path relative to the project root for messages and keep-prefix
/// matching. Falls back to the full path when it lies outside the root.
pub fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// PDF files under the root that the flattened document never references,
/// minus keep matches. Candidates come back in path order.
pub fn unused_pdf_files(
    discovered: &BTreeSet<PathBuf>,
    referenced: &BTreeSet<PathBuf>,
    root: &Path,
    config: &Config,
) -> Vec<PathBuf> {
    discovered
        .difference(referenced)
        .filter(|p| config.should_delete(&relative_display(p, root)))
        .cloned()
        .collect()
}

/// Source `.tex` files whose content now lives in the output: everything the
/// traversal read, except the output itself, files without a `.tex`
/// extension, and keep matches.
pub fn unused_tex_files(
    seen: &BTreeSet<PathBuf>,
    output: &Path,
    root: &Path,
    config: &Config,
) -> Vec<PathBuf> {
    seen.iter()
        .filter(|p| p.as_path() != output)
        .filter(|p| p.extension().is_some_and(|ext| ext == "tex"))
        .filter(|p| config.should_delete(&relative_display(p, root)))
        .cloned()
        .collect()
}
