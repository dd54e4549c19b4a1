//! # find-duplicate-images CLI
//!
//! Command-line interface for the duplicate image finder.
//!
//! ## Usage
//! ```bash
//! find-duplicate-images ~/Photos
//! find-duplicate-images ~/Photos/2023 ~/Photos/2024 --profile strict
//! find-duplicate-images ~/Photos --manual-validation
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
