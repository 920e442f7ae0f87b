use clap::{Subcommand, ValueEnum};
use std::fmt;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the transfer described by the config file
    Run {
        #[arg(long, help = "Config file path")]
        config: String,

        #[arg(long, help = "KEY=VALUE file used to expand ${VAR} references")]
        env_file: Option<String>,

        #[arg(long, help = "If specified, writes the JSON run report to this file")]
        report: Option<String>,
    },
    /// Load and validate the config, then print the statements the run would issue
    Validate {
        #[arg(long, help = "Config file path")]
        config: String,

        #[arg(long, help = "KEY=VALUE file used to expand ${VAR} references")]
        env_file: Option<String>,

        #[arg(
            long,
            help = "If specified, writes the JSON output to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Open one of the configured connections and run `SELECT 1`
    TestConn {
        #[arg(long, help = "Config file path")]
        config: String,

        #[arg(long, help = "KEY=VALUE file used to expand ${VAR} references")]
        env_file: Option<String>,

        #[arg(long, value_enum, default_value_t = Side::Source)]
        side: Side,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}
