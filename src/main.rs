//! lambdakit - per-service Lambda bundles from one compiled Express app

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = lambdakit_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
