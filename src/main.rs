//! Audio Quality CLI
//!
//! Command-line interface for the host/DUT spectrum check.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use audio_quality::cli::commands::{self, CheckOverrides, GenerateOptions};
use audio_quality::cli::{Cli, Commands};
use audio_quality::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Audio Quality v{}", env!("CARGO_PKG_VERSION"));

    let outcome = match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Audio Quality v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(true)
        }
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            println!("FAIL");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{} ({})", e, e.error_code());
            for suggestion in e.recovery_suggestions() {
                eprintln!("  - {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

fn handle_command(cmd: Commands) -> Result<bool> {
    match cmd {
        Commands::Check {
            host,
            dut,
            config,
            f_low,
            f_high,
            margin_low,
            margin_high,
            report,
            tf_out,
        } => {
            let overrides = CheckOverrides {
                f_low,
                f_high,
                margin_low,
                margin_high,
            };
            commands::check(
                &host,
                &dut,
                config.as_deref(),
                &overrides,
                report.as_deref(),
                tf_out.as_deref(),
            )
        }
        Commands::Delay { host, dut } => commands::delay(&host, &dut),
        Commands::Generate {
            output,
            peak,
            duration_ms,
            rate,
            f_low,
            f_high,
            stereo,
            seed,
        } => commands::generate(
            &output,
            &GenerateOptions {
                peak,
                duration_ms,
                rate,
                f_low,
                f_high,
                stereo,
                seed,
            },
        ),
    }
}
