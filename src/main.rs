//! dupescout - report-only duplicate file finder.
//!
//! Entry point for the dupescout CLI.

use clap::Parser;
use dupescout::{cli::Cli, error::ExitCode};

fn main() {
    let cli = Cli::parse();

    match dupescout::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let code = ExitCode::GeneralError;
            eprintln!("[{}] Error: {:#}", code.code_prefix(), err);
            std::process::exit(code.as_i32());
        }
    }
}
