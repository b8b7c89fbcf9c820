//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "send-shield")]
#[command(about = "Local settings service for SendShield delay-send email protection")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// JSON file holding the persisted dashboard settings
    #[arg(short, long, default_value = "sendshield-settings.json")]
    pub store: PathBuf,

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
        let config = Config::try_parse_from(["send-shield"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.store, PathBuf::from("sendshield-settings.json"));
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn overrides() {
        let config = Config::try_parse_from([
            "send-shield", "-p", "9000", "--host", "0.0.0.0", "--store", "/tmp/s.json", "-v",
        ])
        .unwrap();
        assert_eq!(config.address(), "0.0.0.0:9000");
        assert_eq!(config.store, PathBuf::from("/tmp/s.json"));
        assert_eq!(config.log_level(), "debug");
    }
}
