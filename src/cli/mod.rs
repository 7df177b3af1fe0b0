//! CLI Module
//!
//! Command-line interface for the audio-quality spectrum check.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Audio quality check - compare a device recording against its host stimulus
#[derive(Parser, Debug)]
#[command(name = "audio-quality")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the DUT transfer function against the host recording
    #[command(name = "check")]
    Check {
        /// Host (reference) recording
        host: PathBuf,

        /// Device-under-test recording
        dut: PathBuf,

        /// JSON file with band and margin settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Lower band edge in Hz
        #[arg(long)]
        f_low: Option<u32>,

        /// Upper band edge in Hz
        #[arg(long)]
        f_high: Option<u32>,

        /// Allowed deviation below 1.0, in percent
        #[arg(long)]
        margin_low: Option<f64>,

        /// Allowed deviation above 1.0, in percent
        #[arg(long)]
        margin_high: Option<f64>,

        /// Write a JSON report here
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Store the fixed-point transfer function (value x 256, one sample per
        /// bin) as a mono WAV here; the header rate is the recordings' rate and
        /// has no meaning for per-bin data
        #[arg(long)]
        tf_out: Option<PathBuf>,
    },

    /// Estimate the delay of the DUT recording inside the host recording
    #[command(name = "delay")]
    Delay {
        /// Host (reference) recording
        host: PathBuf,

        /// Device-under-test recording
        dut: PathBuf,
    },

    /// Generate a band-limited random stimulus
    #[command(name = "generate")]
    Generate {
        /// Output WAV file
        output: PathBuf,

        /// Peak sample amplitude
        #[arg(long, default_value_t = 10000)]
        peak: i16,

        /// Duration in milliseconds
        #[arg(long, default_value_t = 1000)]
        duration_ms: u32,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 44100)]
        rate: u32,

        /// Lower passband edge in Hz
        #[arg(long, default_value_t = 500)]
        f_low: u32,

        /// Upper passband edge in Hz
        #[arg(long, default_value_t = 15000)]
        f_high: u32,

        /// Write two identical channels
        #[arg(long)]
        stereo: bool,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_overrides() {
        let cli = Cli::try_parse_from([
            "audio-quality",
            "check",
            "host.wav",
            "dut.wav",
            "--f-high",
            "8000",
            "--margin-low",
            "2.5",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Check {
                f_high,
                margin_low,
                f_low,
                ..
            }) => {
                assert_eq!(f_high, Some(8000));
                assert_eq!(margin_low, Some(2.5));
                assert_eq!(f_low, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_generate_defaults() {
        let cli = Cli::try_parse_from(["audio-quality", "-v", "generate", "out.wav"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Generate {
                peak,
                rate,
                stereo,
                seed,
                ..
            }) => {
                assert_eq!(peak, 10000);
                assert_eq!(rate, 44100);
                assert!(!stereo);
                assert_eq!(seed, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
