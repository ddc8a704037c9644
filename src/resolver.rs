use std::path::{Path, PathBuf};

use crate::error::Error;

/// Resolve one inclusion directive name to an existing file.
///
/// Candidates are tried relative to the including file's directory first,
/// then relative to `bib_dir` when one is configured. Within each directory
/// the literal name is tried before the `.tex` variant. Matching is
/// case-sensitive and only regular files count; the first hit wins and is
/// returned canonicalized.
///
/// # Errors
///
/// Returns `Error::UnresolvedInclude` with every candidate path tried when
/// no candidate exists, or `Error::FileRead` if the winning candidate
/// cannot be canonicalized.
pub fn resolve_include(
    name: &str,
    base_dir: &Path,
    bib_dir: Option<&Path>,
) -> Result<PathBuf, Error> {
    let candidates = candidate_names(name);
    let mut searched = Vec::new();

    for dir in std::iter::once(base_dir).chain(bib_dir) {
        for candidate in &candidates {
            let path = dir.join(candidate);
            if path.is_file() {
                return canonicalize(&path);
            }
            searched.push(path);
        }
    }

    Err(Error::UnresolvedInclude {
        name: name.to_string(),
        searched,
    })
}

/// Candidate file names for a directive name: the literal name, plus the
/// `.tex` variant when the final component carries no extension. A dot in
/// a directory component (`v2.0/intro`) does not count as an extension.
fn candidate_names(name: &str) -> Vec<String> {
    let mut candidates = vec![name.to_string()];
    if Path::new(name).extension().is_none() {
        candidates.push(format!("{name}.tex"));
    }
    candidates
}

/// Resolve an asset name to an existing file, canonicalized. The project
/// root itself is tried first, regardless of the configured graphics
/// directories, then each graphics directory in order. Misses are `None`,
/// never an error.
pub fn resolve_asset(name: &str, root: &Path, graphics_dirs: &[String]) -> Option<PathBuf> {
    let direct = std::iter::once(root.join(name));
    for path in direct.chain(graphics_dirs.iter().map(|dir| root.join(dir).join(name))) {
        if path.is_file()
            && let Ok(canonical) = path.canonicalize()
        {
            return Some(canonical);
        }
    }
    None
}

/// Canonicalize a path, attributing failure to the path itself.
///
/// # Errors
///
/// Returns `Error::FileRead` if the path does not exist or cannot be
/// resolved.
pub fn canonicalize(path: &Path) -> Result<PathBuf, Error> {
    path.canonicalize().map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Collapse `.` and `..` components in a path without touching the
/// filesystem. Used for paths that may not exist yet, such as the output
/// file. Preserves leading `..` when there is nothing left to pop.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<std::path::Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    components.iter().collect()
}

/// Handle a single path component during normalization.
/// Pops the last component for `..` when possible, preserves it otherwise.
fn push_normalized_component<'a>(
    components: &mut Vec<std::path::Component<'a>>,
    component: std::path::Component<'a>,
) {
    match component {
        std::path::Component::CurDir => {}
        std::path::Component::ParentDir => {
            let can_pop = matches!(
                components.last(),
                Some(c) if !matches!(c, std::path::Component::ParentDir)
            );
            if can_pop { components.pop(); } else { components.push(component); }
        }
        other => components.push(other),
    }
}
