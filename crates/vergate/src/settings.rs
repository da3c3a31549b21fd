use serde::{Deserialize, Serialize};
use std::path::Path;
use vergate_core::UpdateBehavior;
use vergate_platform::AppPaths;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub app_id: String,

    #[serde(default)]
    pub oracle: OracleSettings,

    #[serde(default)]
    pub update_behavior: UpdateBehavior,

    #[serde(default)]
    pub store_url: Option<String>,

    /// Program and arguments of a native update flow. When set it runs
    /// before the store page is opened, which is only used if it fails.
    #[serde(default)]
    pub native_update_command: Option<Vec<String>>,

    #[serde(default)]
    pub installed_version_override: Option<String>,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_retry_delays")]
    pub retry_delays_secs: Vec<u64>,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OracleSettings {
    Store {
        #[serde(default = "default_locale")]
        locale: String,
        #[serde(default)]
        pattern: Option<String>,
    },
    Backend {
        endpoint: String,
        #[serde(default)]
        version_field: Option<String>,
    },
    #[serde(rename = "github")]
    GitHub { repo: String },
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self::Store {
            locale: default_locale(),
            pattern: None,
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_retry_delays() -> Vec<u64> {
    vec![0]
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            oracle: OracleSettings::default(),
            update_behavior: UpdateBehavior::default(),
            store_url: None,
            native_update_command: None,
            installed_version_override: None,
            http_timeout_secs: default_http_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            retry_delays_secs: default_retry_delays(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl AppSettings {
    pub fn load(paths: &AppPaths) -> Self {
        Self::load_from(&paths.settings_file())
    }

    pub fn load_from(settings_path: &Path) -> Self {
        if !settings_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(settings_path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|error| {
                log::warn!(
                    "Ignoring invalid settings file {}: {error}",
                    settings_path.display()
                );
                Self::default()
            }),
            Err(error) => {
                log::warn!(
                    "Could not read settings file {}: {error}",
                    settings_path.display()
                );
                Self::default()
            }
        }
    }

    pub fn save(&self, paths: &AppPaths) -> Result<(), std::io::Error> {
        paths.ensure_dirs()?;

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.settings_file(), content)?;
        Ok(())
    }
}
