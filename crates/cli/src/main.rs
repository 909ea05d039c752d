mod args;
mod output;
mod runner;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

use args::{Cli, Commands};
use portlens_common::PortlensError;
use runner::run_scan;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Scan(args) => run_scan(args).await,
    };

    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code(&err);
            if code != 130 {
                eprintln!("[!] Error: {:#}", err);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Map the first scan error in the chain to a process exit code.
fn exit_code(err: &anyhow::Error) -> u8 {
    let scan_error = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<PortlensError>());

    match scan_error {
        Some(e) if e.is_input_error() => 2,
        Some(PortlensError::ResolutionFailed(_)) => 3,
        Some(PortlensError::PermissionDenied(_)) => 4,
        Some(PortlensError::Cancelled) => 130,
        _ => 1,
    }
}
