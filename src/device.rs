use serde::Deserialize;

/// Screen measurements in physical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Measurements {
    pub width: u32,
    pub height: u32,
}

/// Device and targeting facts used to shape ad-aware requests.
pub trait DeviceInfoProvider: Send + Sync {
    /// Stable per-installation id, sent as `customer_id`.
    fn device_id(&self) -> String;
    fn user_agent(&self) -> Option<String>;
    fn carrier(&self) -> Option<String>;
    /// MCC+MNC of the network operator.
    fn network_operator(&self) -> Option<String>;
    fn advertising_id(&self) -> Option<String>;
    /// ISO 639 language code.
    fn locale(&self) -> String;
    fn device(&self) -> Measurements;
    /// Container the picker grid is rendered into; bounds the ad width.
    fn media_selector_container(&self) -> Measurements;
    fn density_scale_factor(&self) -> f32;
    fn os(&self) -> String;
    fn os_version(&self) -> String;
    fn manufacturer(&self) -> String;
    fn model(&self) -> String;
    fn app_version(&self) -> String;
}

/// Statically configured device facts, read from the `[device]` config table.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeviceProfile {
    #[serde(default)]
    pub installation_id: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub screen_width: u32,
    #[serde(default)]
    pub screen_height: u32,
    #[serde(default)]
    pub selector_width: u32,
    #[serde(default)]
    pub selector_height: u32,
    #[serde(default)]
    pub pixel_ratio: Option<f32>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub advertising_id: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub network_operator: Option<String>,
}

impl DeviceProfile {
    /// Fill the installation id so every request of this process reports the same one.
    pub fn ensure_installation_id(mut self) -> Self {
        if self.installation_id.as_deref().map_or(true, |s| s.trim().is_empty()) {
            let generated = uuid::Uuid::new_v4().to_string();
            tracing::warn!(installation_id = %generated, "no installation id configured; generated one for this process");
            self.installation_id = Some(generated);
        }
        self
    }
}

fn language_from_env() -> Option<String> {
    let raw = std::env::var("LC_ALL").or_else(|_| std::env::var("LANG")).ok()?;
    let lang = raw.split(['_', '.', '-']).next()?.trim().to_ascii_lowercase();
    match lang.as_str() {
        "" | "c" | "posix" => None,
        _ => Some(lang),
    }
}

impl DeviceInfoProvider for DeviceProfile {
    fn device_id(&self) -> String {
        self.installation_id.clone().unwrap_or_default()
    }
    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }
    fn carrier(&self) -> Option<String> {
        self.carrier.clone().filter(|s| !s.is_empty())
    }
    fn network_operator(&self) -> Option<String> {
        self.network_operator.clone().filter(|s| !s.is_empty())
    }
    fn advertising_id(&self) -> Option<String> {
        self.advertising_id.clone()
    }
    fn locale(&self) -> String {
        self.locale.clone().or_else(language_from_env).unwrap_or_else(|| "en".to_string())
    }
    fn device(&self) -> Measurements {
        Measurements { width: self.screen_width, height: self.screen_height }
    }
    fn media_selector_container(&self) -> Measurements {
        Measurements { width: self.selector_width, height: self.selector_height }
    }
    fn density_scale_factor(&self) -> f32 {
        self.pixel_ratio.unwrap_or(1.0)
    }
    fn os(&self) -> String {
        self.os.clone().unwrap_or_else(|| std::env::consts::OS.to_string())
    }
    fn os_version(&self) -> String {
        self.os_version.clone().unwrap_or_default()
    }
    fn manufacturer(&self) -> String {
        self.manufacturer.clone().unwrap_or_default()
    }
    fn model(&self) -> String {
        self.model.clone().unwrap_or_default()
    }
    fn app_version(&self) -> String {
        self.app_version.clone().unwrap_or_else(|| "1.0".to_string())
    }
}
