use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::device::DeviceProfile;

pub const DEFAULT_BASE_URL: &str = "https://api.klipy.com/api/v1/";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct KlipyConfig {
    /// Per-tenant key; becomes a path segment of every request.
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Log every HTTP exchange at info level.
    #[serde(default)]
    pub enable_logging: bool,
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub device: DeviceProfile,
}

impl Default for KlipyConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            base_url: default_base_url(),
            enable_logging: false,
            connect_timeout_secs: default_timeout_secs(),
            request_timeout_secs: default_timeout_secs(),
            device: DeviceProfile::default(),
        }
    }
}

impl KlipyConfig {
    pub fn with_secret_key(secret_key: impl Into<String>) -> Self {
        Self { secret_key: secret_key.into(), ..Self::default() }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("parsing klipy config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading config file: {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    /// Platform config location, e.g. `~/.config/klipy/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "klipy", "klipy").map(|p| p.config_dir().join("config.toml"))
    }

    /// Load from `path` (or the default location when it exists), then apply `KLIPY_*` env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub(crate) fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("KLIPY_SECRET_KEY").filter(|s| !s.trim().is_empty()) {
            self.secret_key = key;
        }
        if let Some(url) = var("KLIPY_BASE_URL").filter(|s| !s.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(flag) = var("KLIPY_ENABLE_LOGGING") {
            self.enable_logging = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let cfg = KlipyConfig::from_toml_str("secret_key = \"abc\"").unwrap();
        assert_eq!(cfg.secret_key, "abc");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.connect_timeout_secs, 30);
        assert!(!cfg.enable_logging);
        assert!(cfg.device.installation_id.is_none());
    }

    #[test]
    fn reads_device_table_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
secret_key = "abc"
enable_logging = true

[device]
installation_id = "install-42"
screen_width = 1080
screen_height = 2400
pixel_ratio = 2.5
carrier = "Vodafone"
"#,
        )
        .unwrap();

        let cfg = KlipyConfig::from_file(&path).unwrap();
        assert!(cfg.enable_logging);
        assert_eq!(cfg.device.installation_id.as_deref(), Some("install-42"));
        assert_eq!(cfg.device.screen_width, 1080);
        assert_eq!(cfg.device.pixel_ratio, Some(2.5));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(KlipyConfig::load(Some(&tmp.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = KlipyConfig::with_secret_key("from-file");
        cfg.apply_env_overrides(|key| match key {
            "KLIPY_SECRET_KEY" => Some("from-env".into()),
            "KLIPY_ENABLE_LOGGING" => Some("TRUE".into()),
            _ => None,
        });
        assert_eq!(cfg.secret_key, "from-env");
        assert!(cfg.enable_logging);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }
}
