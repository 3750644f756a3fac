//! # Folio Configuration
//!
//! Settings for the back-office daemon.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FOLIO_DATA_DIR=/srv/folio                                          │
//! │     FOLIO_REPORT_INTERVAL_SECS=3600                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/backoffice/folio.toml (Linux)                            │
//! │     ~/Library/Application Support/com.folio.backoffice/folio.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Daily reports over the last 24 hours, top 5 sellers                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # folio.toml
//! [storage]
//! data_dir = "/var/lib/folio"
//!
//! [reports]
//! interval_secs = 86400
//! window_hours = 24
//! top_sellers = 5
//! run_on_startup = false
//!
//! [logging]
//! filter = "info,folio=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use folio_core::{REPORT_WINDOW_HOURS, TOP_SELLERS_LIMIT};

use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Storage Settings
// =============================================================================

/// Where snapshot files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory holding `books.json`, `orders.json`, etc.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "folio", "backoffice")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            data_dir: default_data_dir(),
        }
    }
}

// =============================================================================
// Report Settings
// =============================================================================

/// Sales report schedule and shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Seconds between scheduled runs.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Length of the window ending at the run time.
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,

    /// How many books the top-seller list keeps.
    #[serde(default = "default_top_sellers")]
    pub top_sellers: usize,

    /// Generate one report immediately when the scheduler starts.
    #[serde(default)]
    pub run_on_startup: bool,
}

/// Longest accepted report window: one hundred years.
pub const MAX_WINDOW_HOURS: i64 = 100 * 366 * 24;

/// Longest accepted pause between scheduled runs: one year.
pub const MAX_INTERVAL_SECS: u64 = 366 * 24 * 60 * 60;

fn default_interval_secs() -> u64 {
    24 * 60 * 60
}

fn default_window_hours() -> i64 {
    REPORT_WINDOW_HOURS
}

fn default_top_sellers() -> usize {
    TOP_SELLERS_LIMIT
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            interval_secs: default_interval_secs(),
            window_hours: default_window_hours(),
            top_sellers: default_top_sellers(),
            run_on_startup: false,
        }
    }
}

impl ReportSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.min(MAX_INTERVAL_SECS))
    }

    /// Capped at [`MAX_WINDOW_HOURS`] so an unvalidated value cannot overflow.
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.window_hours.min(MAX_WINDOW_HOURS))
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,folio=debug".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub reports: ReportSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl FolioConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Load from TOML file (if exists)
    /// 3. Override with `FOLIO_*` environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> ServiceResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading folio config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load folio config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ServiceResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ServiceError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ServiceError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ServiceError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Folio config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.reports.interval_secs == 0 {
            return Err(ServiceError::InvalidConfig(
                "reports.interval_secs must be greater than 0".into(),
            ));
        }

        if self.reports.interval_secs > MAX_INTERVAL_SECS {
            return Err(ServiceError::InvalidConfig(format!(
                "reports.interval_secs must be at most {MAX_INTERVAL_SECS}"
            )));
        }

        if self.reports.window_hours <= 0 {
            return Err(ServiceError::InvalidConfig(
                "reports.window_hours must be greater than 0".into(),
            ));
        }

        if self.reports.window_hours > MAX_WINDOW_HOURS {
            return Err(ServiceError::InvalidConfig(format!(
                "reports.window_hours must be at most {MAX_WINDOW_HOURS}"
            )));
        }

        if self.reports.top_sellers == 0 {
            return Err(ServiceError::InvalidConfig(
                "reports.top_sellers must be greater than 0".into(),
            ));
        }

        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ServiceError::InvalidConfig("storage.data_dir is empty".into()));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    ///
    /// Unparsable numeric values are ignored with a warning.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("FOLIO_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data dir from environment");
            self.storage.data_dir = PathBuf::from(dir);
        }

        if let Ok(secs) = std::env::var("FOLIO_REPORT_INTERVAL_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.reports.interval_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid FOLIO_REPORT_INTERVAL_SECS"),
            }
        }

        if let Ok(hours) = std::env::var("FOLIO_REPORT_WINDOW_HOURS") {
            match hours.parse::<i64>() {
                Ok(h) => self.reports.window_hours = h,
                Err(_) => warn!(value = %hours, "Ignoring invalid FOLIO_REPORT_WINDOW_HOURS"),
            }
        }

        if let Ok(top) = std::env::var("FOLIO_TOP_SELLERS") {
            match top.parse::<usize>() {
                Ok(n) => self.reports.top_sellers = n,
                Err(_) => warn!(value = %top, "Ignoring invalid FOLIO_TOP_SELLERS"),
            }
        }

        if let Ok(filter) = std::env::var("FOLIO_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "folio", "backoffice")
            .map(|dirs| dirs.config_dir().join("folio.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FolioConfig::default();
        assert_eq!(config.reports.interval_secs, 86_400);
        assert_eq!(config.reports.window_hours, 24);
        assert_eq!(config.reports.top_sellers, 5);
        assert!(!config.reports.run_on_startup);
        assert_eq!(config.logging.filter, "info,folio=debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = FolioConfig::default();

        config.reports.interval_secs = 0;
        assert!(config.validate().is_err());

        config.reports.interval_secs = 60;
        config.reports.window_hours = 0;
        assert!(config.validate().is_err());

        config.reports.window_hours = 1;
        config.reports.top_sellers = 0;
        assert!(config.validate().is_err());

        config.reports.top_sellers = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_oversized_durations_are_rejected() {
        let mut config = FolioConfig::default();

        config.reports.window_hours = i64::MAX;
        assert!(matches!(config.validate(), Err(ServiceError::InvalidConfig(_))));
        assert_eq!(config.reports.window(), chrono::Duration::hours(MAX_WINDOW_HOURS));

        config.reports.window_hours = MAX_WINDOW_HOURS;
        assert!(config.validate().is_ok());

        config.reports.interval_secs = u64::MAX;
        assert!(config.validate().is_err());
        assert_eq!(config.reports.interval(), Duration::from_secs(MAX_INTERVAL_SECS));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: FolioConfig = toml::from_str(
            r#"
            [reports]
            interval_secs = 3600
            "#,
        )
        .unwrap();
        assert_eq!(config.reports.interval(), Duration::from_secs(3600));
        assert_eq!(config.reports.window(), chrono::Duration::hours(24));
        assert_eq!(config.reports.top_sellers, 5);
    }

    #[test]
    fn test_toml_serialization() {
        let config = FolioConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[reports]"));
        assert!(toml_str.contains("[logging]"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join(format!("folio-missing-{}.toml", uuid::Uuid::new_v4()));
        let config = FolioConfig::load(Some(path)).unwrap();
        assert_eq!(config.reports.top_sellers, 5);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("folio-config-{}", uuid::Uuid::new_v4()))
            .join("folio.toml");

        let mut config = FolioConfig::default();
        config.reports.top_sellers = 7;
        config.save(Some(path.clone())).unwrap();

        let loaded = FolioConfig::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.reports.top_sellers, 7);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
