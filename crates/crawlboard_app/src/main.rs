mod platform;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    if let Err(err) = platform::run_app(platform::Cli::parse()) {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
