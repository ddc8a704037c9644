//! File watcher: flattens once on startup, then re-flattens on source
//! changes.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands::{self, RunOptions};
use crate::diagnostics;
use crate::error::Error;
use crate::expand;

/// Debounce delay between filesystem events and re-flatten.
const DEBOUNCE_MS: u64 = 100;

/// Collect the directories holding the include tree: the input's own
/// directory plus the directory of every file a probe expansion reads. The
/// probe's errors are ignored; a broken tree still watches the input's
/// directory so a fix triggers a re-run.
fn collect_watch_dirs(opts: &RunOptions) -> HashSet<PathBuf> {
    let mut dirs = HashSet::new();

    let input_parent = match opts.input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    dirs.insert(input_parent.canonicalize().unwrap_or(input_parent));

    if let Ok(expansion) = expand::Expander::new(opts.bib_dir.clone()).expand(&opts.input) {
        for path in &expansion.seen {
            if let Some(parent) = path.parent() {
                dirs.insert(parent.to_path_buf());
            }
        }
    }

    return dirs;
}

/// Create a filesystem watcher that signals the channel on relevant events.
/// Events touching only the output file are dropped so the rewrite performed
/// by each run does not retrigger the watcher.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
    output: PathBuf,
) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
            && (event.paths.is_empty()
                || event
                    .paths
                    .iter()
                    .any(|p| p.canonicalize().unwrap_or_else(|_| p.clone()) != output))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return Error::Watch {
            reason: e.to_string(),
        };
    });
}

/// Entry point for watch mode.
///
/// Flattens once, then re-flattens whenever a watched directory changes.
/// Deletion flags are rejected at the CLI level, so each re-run only
/// rewrites the output.
///
/// # Errors
///
/// Returns errors from watcher setup. Flatten errors are printed and kept in
/// that run's exit code so the watcher stays alive across broken states.
pub fn run(opts: &RunOptions) -> Result<ExitCode, Error> {
    eprintln!("watch: initial flatten");
    let mut last_code = run_flatten(opts);

    // The output may not exist until the first successful run.
    let output = opts
        .output
        .canonicalize()
        .unwrap_or_else(|_| opts.output.clone());

    let watch_dirs = collect_watch_dirs(opts);
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx, output)?;

    for dir in &watch_dirs {
        if dir.exists() {
            let _ = watcher.watch(dir, RecursiveMode::NonRecursive);
        }
    }

    let dir_count = watch_dirs.len();
    eprintln!("watch: monitoring {dir_count} directories, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-flattening...");
        last_code = run_flatten(opts);
    }

    return Ok(last_code);
}

/// Run one flatten and print any error. Returns that run's exit code.
fn run_flatten(opts: &RunOptions) -> ExitCode {
    return match commands::run(opts) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
