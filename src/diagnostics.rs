use std::fmt::Write as _;

use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where the fix is
/// mechanical, how to fix it. Designed to be readable by both humans and
/// LLM agents.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::IncludeCycle { chain } => render_include_cycle(chain),
        Error::InputIsOutput { path } => render_input_is_output(path),
        Error::UnresolvedInclude { name, searched } => render_unresolved_include(name, searched),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::FileRead { path, source } => format!("\
# Error: File Read

Cannot read `{}`: {source}
", path.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: JSON Serialization

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Check the syntax of `.texflat.toml`.
"),
        Error::Watch { reason } => format!("\
# Error: Watch Setup

{reason}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_include_cycle(chain: &[std::path::PathBuf]) -> String {
    let chain_str = chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ");

    format!(
        "\
# Error: Include Cycle

Circular inclusion chain: {chain_str}

## Fix

Remove the `\\input` or `\\include` that closes the loop. A file may appear
in several branches of the tree but never inside its own expansion.
"
    )
}

fn render_input_is_output(path: &std::path::Path) -> String {
    format!(
        "\
# Error: Input Is Output

`{}` names both the input and the output, so flattening would overwrite
the source while reading it.

## Fix

Pick a different output path.
",
        path.display()
    )
}

fn render_unresolved_include(name: &str, searched: &[std::path::PathBuf]) -> String {
    let mut out = format!(
        "\
# Error: Unresolved Include

No file exists for `\\input{{{name}}}`.

## Searched

"
    );
    for path in searched {
        let _ = writeln!(out, "- `{}`", path.display());
    }

    out.push_str(
        "\
\n## Fix

Create the file, fix the directive name, or pass the directory holding it
via `--bib-dir`.
",
    );
    out
}
