use std::process::ExitCode;

use clap::Parser;
use scout_cli::bootstrap_helpers::init_tracing;
use scout_cli::{run_cli, Cli};

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
