use crate::core::config::PolicySettings;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "memclockd")]
#[command(version, about = "Utilization-driven memory clock control for NVIDIA GPUs")]
pub struct Cli {
    /// Utilization threshold (percent) to boost power state
    #[arg(short = 'b', long = "boost", value_name = "UTIL", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub boost: Option<u8>,

    /// Utilization threshold (percent) to lower power state
    #[arg(short = 'l', long = "low-power", value_name = "UTIL", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub low_power: Option<u8>,

    /// Time (ms) the boost condition must hold before boosting
    #[arg(short = 'B', long = "boost-time", value_name = "MS")]
    pub boost_time: Option<u64>,

    /// Time (ms) the low power condition must hold before lowering
    #[arg(short = 'L', long = "low-power-time", value_name = "MS")]
    pub low_power_time: Option<u64>,

    /// Include encoder and decoder utilization
    #[arg(short = 'c', long = "coder")]
    pub coder: bool,

    /// Increase verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Settings file (TOML)
    #[arg(short = 'C', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Policy values given on the command line; unset flags stay `None`.
    pub fn policy_overrides(&self) -> PolicySettings {
        PolicySettings {
            boost: self.boost,
            low_power: self.low_power,
            boost_time_ms: self.boost_time,
            low_power_time_ms: self.low_power_time,
            coder: self.coder.then_some(true),
        }
    }
}
