//! diary-sync - InternYet diary submission CLI
//!
//! Backs up the portal's entries, then creates or updates one diary entry
//! per day from a local JSON file.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use diary_sync::Result;
use diary_sync::app::{self, AppContext};
use diary_sync::cli::Cli;

fn main() -> ExitCode {
    // Credentials may live in ./.env; real environment variables win.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.robot {
                // Robot mode: structured error on stdout
                let error_json = serde_json::json!({
                    "error": true,
                    "message": e.to_string(),
                    "details": e.to_structured(),
                });
                println!("{}", serde_json::to_string(&error_json).unwrap_or_default());
            } else {
                eprintln!("Error: {e}");
                let code = e.code();
                eprintln!("Hint [{}]: {}", code.code_string(), code.suggestion());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    app::run(&ctx)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        let filter = EnvFilter::new("error");
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,diary_sync=info",
        1 => "info,diary_sync=debug",
        2 => "debug,diary_sync=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
