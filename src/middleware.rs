//! Request shaping applied to every outgoing call before it reaches the transport.

use std::sync::Arc;

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::Request;
use tracing::warn;
use url::Url;

use crate::device::DeviceInfoProvider;
use crate::service::Endpoint;

pub const CUSTOMER_ID: &str = "customer_id";
pub const LOCALE: &str = "locale";
pub const AD_MIN_WIDTH: &str = "ad-min-width";
pub const AD_MAX_WIDTH: &str = "ad-max-width";
pub const AD_MIN_HEIGHT: &str = "ad-min-height";
pub const AD_MAX_HEIGHT: &str = "ad-max-height";
pub const AD_IFA: &str = "ad-ifa";
pub const AD_APP_VERSION: &str = "ad-app-version";
pub const AD_OS: &str = "ad-os";
pub const AD_OS_VERSION: &str = "ad-osv";
pub const AD_MANUFACTURER: &str = "ad-make";
pub const AD_MODEL: &str = "ad-model";
pub const AD_DEVICE_WIDTH: &str = "ad-device-w";
pub const AD_DEVICE_HEIGHT: &str = "ad-device-h";
pub const AD_PIXEL_RATIO: &str = "ad-pxratio";
pub const AD_LANGUAGE: &str = "ad-language";
pub const AD_CARRIER: &str = "ad-carrier";
pub const AD_MCCMNC: &str = "ad-mccmnc";
pub const AD_YEAR_OF_BIRTH: &str = "ad-yob";
pub const AD_GENDER: &str = "ad-gender";

const MIN_DIMENSION_FALLBACK: i64 = 50;
const MAX_DIMENSION_FALLBACK: i64 = 200;

// Demo profile values until real user data is wired in.
const DEMO_YEAR_OF_BIRTH: &str = "1980";
const DEMO_GENDER: &str = "M";

/// A request rewrite step.
pub trait RequestTransform: Send + Sync {
    fn applies_to(&self, _endpoint: Endpoint) -> bool {
        true
    }
    fn apply(&self, request: &mut Request);
}

/// Replace the first occurrence of `name` in place (dropping repeats), or append it.
pub fn set_query_param(url: &mut Url, name: &str, value: &str) {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let mut seen = false;
    pairs.retain_mut(|(k, v)| {
        if k != name {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        *v = value.to_string();
        true
    });
    if !seen {
        pairs.push((name.to_string(), value.to_string()));
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs().find(|(k, _)| k == name).map(|(_, v)| v.into_owned())
}

/// Adds device/targeting parameters and the user agent to ad-aware calls.
pub struct TargetingInjector {
    device: Arc<dyn DeviceInfoProvider>,
}

impl TargetingInjector {
    pub fn new(device: Arc<dyn DeviceInfoProvider>) -> Self {
        Self { device }
    }
}

impl RequestTransform for TargetingInjector {
    fn applies_to(&self, endpoint: Endpoint) -> bool {
        endpoint.is_ad_aware()
    }

    fn apply(&self, request: &mut Request) {
        let d = &self.device;
        let screen = d.device();
        let selector = d.media_selector_container();
        let locale = d.locale();

        let mut params: Vec<(&str, String)> = vec![
            (CUSTOMER_ID, d.device_id()),
            (LOCALE, locale.clone()),
            (AD_MIN_WIDTH, MIN_DIMENSION_FALLBACK.to_string()),
            (AD_MAX_WIDTH, selector.width.to_string()),
            (AD_MIN_HEIGHT, MIN_DIMENSION_FALLBACK.to_string()),
            (AD_MAX_HEIGHT, MAX_DIMENSION_FALLBACK.to_string()),
        ];
        if let Some(ifa) = d.advertising_id() {
            params.push((AD_IFA, ifa));
        }
        params.extend([
            (AD_APP_VERSION, d.app_version()),
            (AD_OS, d.os()),
            (AD_OS_VERSION, d.os_version()),
            (AD_MANUFACTURER, d.manufacturer()),
            (AD_MODEL, d.model()),
            (AD_DEVICE_WIDTH, screen.width.to_string()),
            (AD_DEVICE_HEIGHT, screen.height.to_string()),
            (AD_PIXEL_RATIO, d.density_scale_factor().to_string()),
            (AD_LANGUAGE, locale),
        ]);
        if let Some(carrier) = d.carrier() {
            params.push((AD_CARRIER, carrier));
        }
        if let Some(op) = d.network_operator() {
            params.push((AD_MCCMNC, op));
        }
        params.push((AD_YEAR_OF_BIRTH, DEMO_YEAR_OF_BIRTH.to_string()));
        params.push((AD_GENDER, DEMO_GENDER.to_string()));

        let url = request.url_mut();
        for (name, value) in &params {
            set_query_param(url, name, value);
        }

        if let Some(ua) = d.user_agent() {
            match HeaderValue::from_str(&ua) {
                Ok(value) => {
                    request.headers_mut().insert(USER_AGENT, value);
                }
                Err(e) => warn!(error = %e, "ignoring invalid user agent"),
            }
        }
    }
}

/// Forces the ad dimension parameters to positive values so the API does not reject the call.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdDimensionSanitizer;

impl AdDimensionSanitizer {
    const RULES: [(&'static str, i64); 4] = [
        (AD_MIN_WIDTH, MIN_DIMENSION_FALLBACK),
        (AD_MAX_WIDTH, MAX_DIMENSION_FALLBACK),
        (AD_MIN_HEIGHT, MIN_DIMENSION_FALLBACK),
        (AD_MAX_HEIGHT, MAX_DIMENSION_FALLBACK),
    ];

    pub fn sanitize(url: &mut Url) {
        for (name, fallback) in Self::RULES {
            let current = query_param(url, name).and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(0);
            if current <= 0 {
                set_query_param(url, name, &fallback.to_string());
            }
        }
    }
}

impl RequestTransform for AdDimensionSanitizer {
    fn apply(&self, request: &mut Request) {
        Self::sanitize(request.url_mut());
    }
}

/// Ordered chain of transforms.
#[derive(Clone, Default)]
pub struct RequestPipeline {
    transforms: Vec<Arc<dyn RequestTransform>>,
}

impl RequestPipeline {
    /// Targeting injector followed by the dimension sanitizer.
    pub fn standard(device: Arc<dyn DeviceInfoProvider>) -> Self {
        Self::default()
            .with(TargetingInjector::new(device))
            .with(AdDimensionSanitizer)
    }

    pub fn with(mut self, transform: impl RequestTransform + 'static) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

    pub fn apply(&self, endpoint: Endpoint, request: &mut Request) {
        for t in self.transforms.iter().filter(|t| t.applies_to(endpoint)) {
            t.apply(request);
        }
    }
}
