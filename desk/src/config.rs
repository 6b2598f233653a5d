use std::path::PathBuf;

use platform_db::ConfigStore;

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_LOG_DIR: &str = "logs";

/// Process-level settings read from the environment. Database settings live
/// in the JSON file at `config_path`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub config_path: PathBuf,
    /// `None` when `SED_LOG_DIR` is set to an empty string.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Self {
        Self::from_vars(
            std::env::var("SED_CONFIG").ok(),
            std::env::var("SED_LOG_DIR").ok(),
        )
    }

    fn from_vars(config: Option<String>, log_dir: Option<String>) -> Self {
        let config_path = config
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
        let log_dir = match log_dir {
            Some(dir) if dir.trim().is_empty() => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => Some(PathBuf::from(DEFAULT_LOG_DIR)),
        };
        Self {
            config_path: PathBuf::from(config_path),
            log_dir,
        }
    }

    pub fn store(&self) -> ConfigStore {
        ConfigStore::new(&self.config_path)
    }
}
