use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;
use log::LevelFilter;

use super::config::{AppConfig, DEFAULT_CONFIG_FILENAME};

pub const DEFAULT_LOG_FILENAME: &str = "crawlboard.log";

/// Terminal dashboard for a URL crawl backend.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// RON settings file; a missing file means defaults.
    #[arg(long, env = "CRAWLBOARD_CONFIG", default_value = DEFAULT_CONFIG_FILENAME)]
    pub config: PathBuf,

    #[arg(long, env = "CRAWLBOARD_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, env = "CRAWLBOARD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Header carrying the API key.
    #[arg(long, env = "CRAWLBOARD_API_KEY_HEADER")]
    pub api_key_header: Option<String>,

    #[arg(long, env = "CRAWLBOARD_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    #[arg(long, env = "CRAWLBOARD_ROWS_PER_PAGE")]
    pub rows_per_page: Option<usize>,

    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,

    #[arg(long, env = "CRAWLBOARD_LOG_FILE", default_value = DEFAULT_LOG_FILENAME)]
    pub log_file: PathBuf,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the effective settings to the config file and exit.
    #[arg(long)]
    pub write_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Flags win over the config file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
        if let Some(header) = &self.api_key_header {
            config.api_key_header = header.clone();
        }
        if let Some(poll_interval_ms) = self.poll_interval_ms {
            config.poll_interval_ms = poll_interval_ms;
        }
        if let Some(rows_per_page) = self.rows_per_page {
            config.rows_per_page = rows_per_page;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::try_parse_from([
            "crawlboard",
            "--base-url",
            "http://other:1234",
            "--rows-per-page",
            "20",
            "--api-key-header",
            "X-Custom-Key",
        ])
        .unwrap();
        let mut config = AppConfig {
            base_url: "http://from-file".to_string(),
            poll_interval_ms: 750,
            ..AppConfig::default()
        };

        cli.apply_overrides(&mut config);

        assert_eq!(config.base_url, "http://other:1234");
        assert_eq!(config.rows_per_page, 20);
        assert_eq!(config.api_key_header, "X-Custom-Key");
        assert_eq!(config.poll_interval_ms, 750);
    }

    #[test]
    fn log_target_maps_to_destination() {
        let cli = Cli::try_parse_from(["crawlboard", "--log", "both", "-v"]).unwrap();
        assert_eq!(LogDestination::from(cli.log), LogDestination::Both);
        assert_eq!(cli.log_level(), LevelFilter::Debug);
    }
}
