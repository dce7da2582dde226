//! CTA web call - fetch a Bus Tracker response from the command line
//!
//! Prints the raw response body to stdout. Diagnostics go to stderr through
//! `tracing`; set `RUST_LOG=debug` for call details.

use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{prelude::*, EnvFilter};

use ctaweb::cli::{render_output, CallReport, Cli, StartupConfig};

/// Installs a stderr log subscriber, honouring `RUST_LOG` when set
fn initialize_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false);

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    if let Err(err) = init_result {
        eprintln!("tracing already initialized: {err}");
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    initialize_tracing();

    let config = StartupConfig::from_cli(&cli)?;
    let caller = config.caller();
    // One handle for the whole run; the caller only borrows and resets it
    let mut transport = config.transport()?;

    let mut response = String::new();
    let success = caller.call(&mut transport, &cli.url, &mut response);

    let report = CallReport {
        url: &cli.url,
        mode: caller.mode(),
        success,
        body: success.then_some(response.as_str()),
    };

    if let Some(output) = render_output(config.output, &report)? {
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
    }

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
