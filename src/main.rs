mod cleanup;
mod commands;
mod config;
mod diagnostics;
mod error;
mod expand;
mod resolver;
mod scanner;
mod types;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::commands::RunOptions;

#[derive(Parser)]
#[command(
    name = "texflat",
    about = "Flatten LaTeX \\input/\\include trees into a single document"
)]
struct Cli {
    /// Root .tex document to flatten
    input: PathBuf,

    /// Destination for the flattened document
    output: PathBuf,

    /// Extra directory searched for includes missing next to their source
    #[arg(long, value_name = "DIR")]
    bib_dir: Option<PathBuf>,

    /// Delete the source .tex files whose content now lives in the output
    #[arg(long)]
    delete_tex: bool,

    /// Delete PDF files never referenced by the flattened document
    #[arg(long)]
    delete_unused_pdf: bool,

    /// Print a machine-readable run report to stdout
    #[arg(long)]
    json: bool,

    /// Keep running and re-flatten whenever a source file changes
    #[arg(long, conflicts_with_all = ["delete_tex", "delete_unused_pdf"])]
    watch: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let opts = RunOptions {
        bib_dir: cli.bib_dir,
        delete_tex: cli.delete_tex,
        delete_unused_pdf: cli.delete_unused_pdf,
        input: cli.input,
        json: cli.json,
        output: cli.output,
    };

    let result = if cli.watch {
        watch::run(&opts)
    } else {
        commands::run(&opts)
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    }
}
