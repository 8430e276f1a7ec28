use std::process::ExitCode;

use clap::Parser;
use hoist::cli::{Arguments, ExitStatus};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter (`HOIST_LOG=hoist=trace`).
const LOG_ENV: &str = "HOIST_LOG";

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_tracing(args.verbose());

    match hoist::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}

/// Diagnostics go to stderr so JSON output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "warn,hoist=debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
