//! Portable bundler - turns an installer into a portable ZIP release asset.
//!
//! Exit code 0 means the archive exists and, unless `--no-upload` was given,
//! is attached to the release. Any failure prints a `::error::` annotation
//! and exits with 1.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code
    let exit_code = match portable_bundler::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            portable_bundler::cli::report_failure(&e);
            1
        }
    };

    process::exit(exit_code);
}
