//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod probe;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lifeline - connection lifecycle probe for TCP endpoints.
#[derive(Parser, Debug)]
#[command(name = "lifeline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open, validate and close connections to a target and report latency
    Probe(ProbeArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `lifeline check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `probe` subcommand.
#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Path to configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override target endpoint (HOST:PORT)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Concurrent connections per round
    #[arg(short = 'n', long, default_value = "4")]
    pub count: usize,

    /// Number of rounds
    #[arg(short, long, default_value = "1")]
    pub rounds: u32,

    /// Retries per connection after a refused attempt
    #[arg(long, default_value = "3")]
    pub retries: u32,

    /// Emit one JSON object per round instead of human output
    #[arg(long)]
    pub json: bool,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_defaults() {
        let cli = Cli::try_parse_from(["lifeline", "probe"]).unwrap();
        let Commands::Probe(args) = cli.command else {
            panic!("expected probe");
        };
        assert_eq!(args.config, PathBuf::from("config.toml"));
        assert_eq!(args.count, 4);
        assert_eq!(args.rounds, 1);
        assert_eq!(args.retries, 3);
        assert!(args.target.is_none());
        assert!(!args.json);
    }

    #[test]
    fn probe_overrides() {
        let cli = Cli::try_parse_from([
            "lifeline",
            "probe",
            "--target",
            "10.0.0.1:6379",
            "-n",
            "16",
            "--rounds",
            "3",
            "--json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let Commands::Probe(args) = cli.command else {
            panic!("expected probe");
        };
        assert_eq!(args.target.as_deref(), Some("10.0.0.1:6379"));
        assert_eq!(args.count, 16);
        assert_eq!(args.rounds, 3);
        assert!(args.json);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn check_config_path() {
        let cli = Cli::try_parse_from(["lifeline", "check", "config", "-c", "other.toml"]).unwrap();
        let Commands::Check(CheckCommand::Config(arg)) = cli.command else {
            panic!("expected check config");
        };
        assert_eq!(arg.config, PathBuf::from("other.toml"));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["lifeline", "status"]).is_err());
    }
}
