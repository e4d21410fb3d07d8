//! crewplan - dependency-aware task scheduling for small teams

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = crewplan::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
