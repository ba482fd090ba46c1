//! Configuration settings for Agromate.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for overrides (`AGROMATE_API__BASE_URL`, ...).
const ENV_PREFIX: &str = "AGROMATE";

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API configuration.
    pub api: ApiConfig,
    /// Dashboard data settings.
    pub dashboard: DashboardConfig,
    /// UI configuration.
    pub ui: UiConfig,
    /// Key bindings.
    pub keybindings: KeyBindings,
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    /// for anything not set.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from file and environment.
    ///
    /// A missing file is not an error. Environment variables win over the file.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);
        Self::load_from(&config_path, true)
    }

    fn load_from(config_path: &Path, with_env: bool) -> crate::Result<Self> {
        let mut builder = config::Config::builder().add_source(
            config::File::from(config_path)
                .format(config::FileFormat::Toml)
                .required(false),
        );

        if with_env {
            builder = builder.add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let settings: Self = builder.build()?.try_deserialize()?;
        tracing::debug!(path = %config_path.display(), base_url = %settings.api.base_url, "configuration loaded");
        Ok(settings)
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(default_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

fn default_config_path() -> PathBuf {
    super::config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// Backend API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL, without trailing slash.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// What the dashboard asks the backend for, and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Maximum number of articles requested per load.
    pub news_limit: u32,
    /// Day window for the daily trend and timeline series.
    pub trend_days: u32,
    /// Delay between a successful pipeline trigger and the follow-up reload.
    pub update_reload_delay_ms: u64,
    /// Market quote polling interval in seconds (0 to disable).
    pub market_refresh_secs: u64,
    /// Initial price history window in days.
    pub history_days: u32,
    /// Comma-separated commodity list for the price history panel.
    pub history_commodities: String,
    /// Commodity plotted against the exchange gap in the dollar panel.
    pub correlation_commodity: String,
    /// Day window of the dollar correlation panel.
    pub correlation_days: u32,
    /// Day window for divergence signals.
    pub divergence_days: u32,
    /// Commodities checked for sentiment/price divergence.
    pub divergence_commodities: Vec<String>,
}

impl DashboardConfig {
    /// Delay before reloading after a pipeline trigger.
    pub fn update_reload_delay(&self) -> Duration {
        Duration::from_millis(self.update_reload_delay_ms)
    }

    /// Market polling interval, if enabled.
    pub fn market_refresh_interval(&self) -> Option<Duration> {
        (self.market_refresh_secs > 0).then(|| Duration::from_secs(self.market_refresh_secs))
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            news_limit: 50,
            trend_days: 7,
            update_reload_delay_ms: 3000,
            market_refresh_secs: 60,
            history_days: 30,
            history_commodities: "soja,maiz,trigo".to_string(),
            correlation_commodity: "soja".to_string(),
            correlation_days: 30,
            divergence_days: 7,
            divergence_commodities: vec![
                "soja".to_string(),
                "maiz".to_string(),
                "trigo".to_string(),
            ],
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Tick rate in milliseconds for UI updates.
    pub tick_rate_ms: u64,
    /// Enable mouse support.
    pub mouse_support: bool,
    /// Show status bar.
    pub show_status_bar: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            mouse_support: true,
            show_status_bar: true,
        }
    }
}

impl UiConfig {
    /// Interval between UI ticks, never shorter than 10ms.
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(10))
    }
}

/// Key bindings configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Quit the application.
    pub quit: String,
    /// Show help.
    pub help: String,
    /// Navigate up.
    pub up: String,
    /// Navigate down.
    pub down: String,
    /// Reload the dashboard (also the retry action after an error).
    pub refresh: String,
    /// Trigger the backend analysis pipeline.
    pub update_analysis: String,
    /// Open the filter panel.
    pub filters: String,
    /// Clear all filters.
    pub clear_filters: String,
    /// Switch to the overview.
    pub overview: String,
    /// Switch to the news view.
    pub news: String,
    /// Switch to the trends view.
    pub trends: String,
    /// Switch to the market view.
    pub market: String,
    /// Cycle the price history period.
    pub history_period: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            up: "k".to_string(),
            down: "j".to_string(),
            refresh: "r".to_string(),
            update_analysis: "u".to_string(),
            filters: "f".to_string(),
            clear_filters: "x".to_string(),
            overview: "1".to_string(),
            news: "2".to_string(),
            trends: "3".to_string(),
            market: "4".to_string(),
            history_period: "p".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir().join(format!("agromate-{}.toml", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_defaults_point_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.dashboard.news_limit, 50);
        assert_eq!(config.dashboard.trend_days, 7);
        assert_eq!(config.dashboard.update_reload_delay(), Duration::from_secs(3));
        assert_eq!(
            config.dashboard.market_refresh_interval(),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load_from(&temp_config_path(), false).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let path = temp_config_path();
        std::fs::write(
            &path,
            "[api]\nbase_url = \"http://backend:9000\"\n\n[dashboard]\nnews_limit = 20\nmarket_refresh_secs = 0\n",
        )
        .unwrap();

        let config = Config::load_from(&path, false).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.api.base_url, "http://backend:9000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.dashboard.news_limit, 20);
        assert_eq!(config.dashboard.market_refresh_interval(), None);
        assert_eq!(config.keybindings, KeyBindings::default());
    }

    #[test]
    fn test_save_then_load_keeps_settings() {
        let path = temp_config_path();
        let mut config = Config::default();
        config.dashboard.divergence_commodities = vec!["girasol".to_string()];
        config.save(Some(path.clone())).unwrap();

        let loaded = Config::load_from(&path, false).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }
}
