//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "charge-countdown")]
#[command(about = "A state-managed HTTP server tracking battery-swap countdown timers")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20560")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted state files
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Seconds between writes of tick-driven changes
    #[arg(short, long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    pub save_interval: u64,

    /// Keep state in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn save_period(&self) -> Duration {
        Duration::from_secs(self.save_interval)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["charge-countdown"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20560");
        assert_eq!(config.save_period(), Duration::from_secs(5));
        assert_eq!(config.log_level(), "info");
        assert!(!config.ephemeral);
    }

    #[test]
    fn zero_save_interval_is_rejected() {
        assert!(Config::try_parse_from(["charge-countdown", "--save-interval", "0"]).is_err());
    }

    #[test]
    fn verbose_switches_log_level() {
        let config =
            Config::try_parse_from(["charge-countdown", "-v", "--data-dir", "/tmp/x"]).unwrap();
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/x"));
    }
}
