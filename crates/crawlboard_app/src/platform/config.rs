use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use crawlboard_core::DEFAULT_ROWS_PER_PAGE;
use crawlboard_engine::{
    ApiSettings, EngineSettings, DEFAULT_API_KEY_HEADER, DEFAULT_BULK_DELETE_DELAY,
    DEFAULT_POLL_INTERVAL,
};
use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILENAME: &str = "crawlboard.ron";

/// Settings read from `crawlboard.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub bulk_delete_delay_ms: u64,
    pub rows_per_page: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            base_url: api.base_url,
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            connect_timeout_ms: duration_ms(api.connect_timeout),
            request_timeout_ms: duration_ms(api.request_timeout),
            poll_interval_ms: duration_ms(DEFAULT_POLL_INTERVAL),
            bulk_delete_delay_ms: duration_ms(DEFAULT_BULK_DELETE_DELAY),
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl AppConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            api: ApiSettings {
                base_url: self.base_url.clone(),
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                request_timeout: Duration::from_millis(self.request_timeout_ms),
                api_key: self.api_key.clone().filter(|key| !key.is_empty()),
                api_key_header: self.api_key_header.clone(),
            },
            // A zero period would spin the poller.
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            bulk_delete_delay: Duration::from_millis(self.bulk_delete_delay_ms),
        }
    }
}

/// Read the config file. A missing file means defaults; an unreadable or
/// malformed one is logged and ignored.
pub fn load_config(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            engine_info!("No config at {:?}; using defaults", path);
            return AppConfig::default();
        }
        Err(err) => {
            engine_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            engine_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            engine_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(config, pretty).context("serialize config")?;
    fs::write(path, content).with_context(|| format!("write config to {}", path.display()))?;
    engine_info!("Wrote config to {:?}", path);
    Ok(())
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
