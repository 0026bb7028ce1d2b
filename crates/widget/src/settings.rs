//! Widget settings.
//!
//! Native hosts layer defaults, an optional JSON file and `MEDCHAT_*` environment
//! variables with figment. The browser build constructs settings from the page
//! origin instead.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Upload status texts disappear after this long.
pub const DEFAULT_STATUS_CLEAR_MILLIS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_status_clear_millis")]
    pub status_clear_millis: u64,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            status_clear_millis: default_status_clear_millis(),
        }
    }
}

impl WidgetSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
        .normalized()
    }

    pub fn normalized(mut self) -> Self {
        let base_url = self.base_url.trim().trim_end_matches('/');
        self.base_url = if base_url.is_empty() {
            default_base_url()
        } else {
            base_url.to_string()
        };

        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        if self.status_clear_millis == 0 {
            self.status_clear_millis = DEFAULT_STATUS_CLEAR_MILLIS;
        }

        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_millis(self.status_clear_millis)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_status_clear_millis() -> u64 {
    DEFAULT_STATUS_CLEAR_MILLIS
}

#[cfg(not(target_arch = "wasm32"))]
pub use store::{
    ENV_PREFIX, SETTINGS_DIRECTORY_NAME, SETTINGS_FILE_NAME, SettingsError, SettingsResult,
    SettingsStore,
};

#[cfg(not(target_arch = "wasm32"))]
mod store {
    use std::path::{Path, PathBuf};

    use figment::{
        Figment,
        providers::{Env, Format, Json, Serialized},
    };
    use snafu::{ResultExt, Snafu};

    use super::WidgetSettings;

    pub const SETTINGS_DIRECTORY_NAME: &str = "medchat";
    pub const SETTINGS_FILE_NAME: &str = "settings.json";
    pub const ENV_PREFIX: &str = "MEDCHAT_";

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    pub enum SettingsError {
        #[snafu(display("failed to load settings from {path:?} on `{stage}`: {source}"))]
        Extract {
            stage: &'static str,
            path: PathBuf,
            #[snafu(source(from(figment::Error, Box::new)))]
            source: Box<figment::Error>,
        },
    }

    pub type SettingsResult<T> = Result<T, SettingsError>;

    /// Resolved settings plus where they were read from.
    #[derive(Debug, Clone)]
    pub struct SettingsStore {
        settings: WidgetSettings,
        config_path: PathBuf,
    }

    impl SettingsStore {
        pub fn default_config_dir() -> PathBuf {
            dirs::config_dir()
                .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
                .unwrap_or_else(|| PathBuf::from(".medchat"))
        }

        pub fn default_config_path() -> PathBuf {
            Self::default_config_dir().join(SETTINGS_FILE_NAME)
        }

        pub fn load() -> SettingsResult<Self> {
            Self::load_from(Self::default_config_path())
        }

        /// Defaults, then the JSON file if present, then `MEDCHAT_*` variables.
        pub fn load_from(config_path: PathBuf) -> SettingsResult<Self> {
            let settings = Self::figment(&config_path)
                .extract::<WidgetSettings>()
                .context(ExtractSnafu {
                    stage: "extract-widget-settings",
                    path: config_path.clone(),
                })?
                .normalized();

            tracing::info!(
                path = ?config_path,
                base_url = %settings.base_url,
                "loaded widget settings"
            );

            Ok(Self {
                settings,
                config_path,
            })
        }

        pub fn settings(&self) -> &WidgetSettings {
            &self.settings
        }

        pub fn config_path(&self) -> &Path {
            &self.config_path
        }

        fn figment(path: &Path) -> Figment {
            let mut figment = Figment::from(Serialized::defaults(WidgetSettings::default()));
            if path.exists() {
                figment = figment.merge(Json::file(path));
            } else {
                tracing::info!("settings file not found at {:?}, using defaults", path);
            }
            figment.merge(Env::prefixed(ENV_PREFIX))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_url_and_restores_zero_delays() {
        let settings = WidgetSettings {
            base_url: " http://localhost:5000/ ".to_string(),
            request_timeout_secs: 0,
            status_clear_millis: 0,
        }
        .normalized();

        assert_eq!(settings.base_url, "http://localhost:5000");
        assert_eq!(settings.request_timeout(), Duration::from_secs(120));
        assert_eq!(settings.status_clear_delay(), Duration::from_secs(3));
    }

    #[test]
    fn blank_url_falls_back_to_default() {
        assert_eq!(WidgetSettings::with_base_url("  ").base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn json_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("medchat-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        let path = dir.join(SETTINGS_FILE_NAME);
        std::fs::write(&path, r#"{"base_url":"http://10.0.0.5:8080/","status_clear_millis":500}"#)
            .expect("settings file should be writable");

        let store = SettingsStore::load_from(path.clone()).expect("settings should load");

        assert_eq!(store.settings().base_url, "http://10.0.0.5:8080");
        assert_eq!(store.settings().status_clear_millis, 500);
        assert_eq!(store.settings().request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(store.config_path(), path.as_path());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = std::env::temp_dir().join(format!("medchat-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        let path = dir.join(SETTINGS_FILE_NAME);
        std::fs::write(&path, r#"{"status_clear_millis":"soon"}"#)
            .expect("settings file should be writable");

        assert!(SettingsStore::load_from(path).is_err());

        let _ = std::fs::remove_dir_all(dir);
    }
}
