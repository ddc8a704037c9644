//! The flatten command: expand the include tree, collapse blanks, write the
//! output, then run the optional cleanup passes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::cleanup;
use crate::config::Config;
use crate::error::Error;
use crate::expand;
use crate::resolver;
use crate::scanner;
use crate::types::{DeletionReport, RunReport};

/// Everything one flatten run needs, parsed from the command line.
pub struct RunOptions {
    /// Fallback include directory; overrides the config file when set.
    pub bib_dir: Option<PathBuf>,
    /// Delete flattened-away source `.tex` files after writing the output.
    pub delete_tex: bool,
    /// Delete PDF files the flattened document never references.
    pub delete_unused_pdf: bool,
    /// Root document to flatten.
    pub input: PathBuf,
    /// Print a machine-readable run report to stdout.
    pub json: bool,
    /// Where the flattened document goes.
    pub output: PathBuf,
}

/// Print one deletion outcome in the human format.
fn print_deletion_outcome(kind: &str, report: &DeletionReport, root: &Path) {
    for path in &report.deleted {
        eprintln!("  Deleted: {}", cleanup::relative_display(path, root));
    }
    for failure in &report.failed {
        eprintln!(
            "  Cannot delete {}: {}",
            cleanup::relative_display(&failure.path, root),
            failure.reason
        );
    }
    if report.failed.is_empty() {
        eprintln!("{kind} files: {} deleted.", report.deleted.len());
    } else {
        eprintln!(
            "{kind} files: {} deleted, {} failed.",
            report.deleted.len(),
            report.failed.len()
        );
    }
    return;
}

/// Flatten `opts.input` into `opts.output`, then delete what the flags ask
/// for. Deletion failures are reported and reflected in the exit code, never
/// propagated as errors, so the written output always survives.
///
/// # Errors
///
/// Returns any fatal error from configuration, expansion, or writing the
/// output file.
pub fn run(opts: &RunOptions) -> Result<ExitCode, Error> {
    let root = resolver::canonicalize(&std::env::current_dir()?)?;
    let abs_input = resolver::normalize_path(&root.join(&opts.input));
    let abs_output = resolver::normalize_path(&root.join(&opts.output));
    if abs_input == abs_output {
        return Err(Error::InputIsOutput { path: abs_input });
    }
    // A pre-existing output may be a symlink aliasing the input under a
    // different name; the lexical comparison above cannot see that.
    let canon_input = resolver::canonicalize(&abs_input)?;
    if let Ok(canon_output) = abs_output.canonicalize()
        && canon_output == canon_input
    {
        return Err(Error::InputIsOutput { path: canon_input });
    }

    let config_dir = abs_input
        .parent()
        .map_or_else(|| root.clone(), Path::to_path_buf);
    let config = Config::load(&config_dir)?;
    let bib_dir = opts.bib_dir.clone().or_else(|| config.bib_dir.clone());

    eprintln!("Reading {}", opts.input.display());
    let expansion = expand::Expander::new(bib_dir).expand(&abs_input)?;
    let text = expand::collapse_blank_lines(&expansion.text);

    if let Some(parent) = abs_output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&abs_output, &text)?;
    eprintln!(
        "Wrote {} ({} files inlined)",
        opts.output.display(),
        expansion.seen.len()
    );

    let referenced = scanner::referenced_assets(&text, &root, &config.graphics_dirs);
    // The output exists now; canonicalize it so seen-set comparisons hold.
    let output_canonical = resolver::canonicalize(&abs_output)?;

    let mut report = RunReport {
        inlined: expansion.seen.iter().cloned().collect(),
        input: opts.input.clone(),
        output: opts.output.clone(),
        pdf_deletions: None,
        referenced_pdfs: referenced.iter().cloned().collect(),
        tex_deletions: None,
    };
    let mut failure_count = 0_u32;

    if opts.delete_tex {
        let candidates =
            cleanup::unused_tex_files(&expansion.seen, &output_canonical, &root, &config);
        let outcome = cleanup::delete_files(&candidates);
        print_deletion_outcome("TeX", &outcome, &root);
        failure_count = failure_count
            .saturating_add(outcome.failed.len().try_into().unwrap_or(u32::MAX));
        report.tex_deletions = Some(outcome);
    }

    if opts.delete_unused_pdf {
        let discovered = cleanup::discover_pdfs(&root);
        let candidates = cleanup::unused_pdf_files(&discovered, &referenced, &root, &config);
        if candidates.is_empty() {
            eprintln!("No unused PDF files found to delete.");
        }
        let outcome = cleanup::delete_files(&candidates);
        if !candidates.is_empty() {
            print_deletion_outcome("PDF", &outcome, &root);
        }
        failure_count = failure_count
            .saturating_add(outcome.failed.len().try_into().unwrap_or(u32::MAX));
        report.pdf_deletions = Some(outcome);
    }

    if !opts.delete_tex && !opts.delete_unused_pdf {
        eprintln!(
            "No files were deleted (use --delete-tex or --delete-unused-pdf to enable deletion)."
        );
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    // Exit code priority: deletion failures (2) > success (0).
    if failure_count > 0 {
        return Ok(ExitCode::from(2));
    }
    return Ok(ExitCode::SUCCESS);
}
