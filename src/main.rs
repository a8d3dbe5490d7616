use clap::Parser;
use memclockd::cli::{self, Cli};
use memclockd::common::LogLevel;
use memclockd::core::config;
use memclockd::daemon::{self, DaemonConfig};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_logging(verbose: u8, configured: Option<LogLevel>) -> anyhow::Result<()> {
    let filter = match LogLevel::from_verbosity(verbose) {
        Some(level) => EnvFilter::new(level.as_filter()),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured.unwrap_or_default().as_filter())),
    };
    let timer = fmt::time::UtcTime::new(time::format_description::parse(
        "[hour]:[minute]:[second]",
    )?);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_timer(timer)
                .with_writer(std::io::stderr),
        )
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help, version and usage text go to a closed stream at worst;
            // the exit code below still reports the outcome.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let settings = match config::load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            cli::print_error(&format!("{:#}", e));
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(cli.verbose, settings.daemon.log_level) {
        cli::print_error(&format!("Failed to set up logging: {:#}", e));
        return ExitCode::FAILURE;
    }

    let cfg = match DaemonConfig::resolve(&cli, &settings) {
        Ok(cfg) => cfg,
        Err(e) => {
            cli::print_error(&format!("{:#}", e));
            cli::print_usage();
            return ExitCode::FAILURE;
        }
    };

    match daemon::run::run_with_config(&cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(target: "memclockd::daemon", "{:#}", e);
            ExitCode::FAILURE
        }
    }
}
