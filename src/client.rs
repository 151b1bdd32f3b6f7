use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, Request};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::config::KlipyConfig;
use crate::dto::{CategoriesResponseDto, MediaItemResponseDto, ReportRequestDto, TriggerViewRequestDto};
use crate::error::{DecodeError, KlipyError, Result};
use crate::middleware::RequestPipeline;
use crate::service::{Endpoint, MediaService};
use crate::types::ContentCategory;

/// Build `{base}/{secret_key}/`, tolerating missing or extra slashes.
pub fn api_base_url(base_url: &str, secret_key: &str) -> Result<Url> {
    let key = secret_key.trim().trim_end_matches('/');
    if key.is_empty() {
        return Err(KlipyError::Config("secret key is empty".into()));
    }
    let base = base_url.trim();
    let normalized = if base.ends_with('/') { base.to_string() } else { format!("{base}/") };
    Url::parse(&format!("{normalized}{key}/")).map_err(|e| KlipyError::Config(format!("invalid base url {base}: {e}")))
}

/// Shared transport: one reqwest client plus the request pipeline.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    pipeline: RequestPipeline,
    log_requests: bool,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The base url embeds the secret key.
        f.debug_struct("ApiClient")
            .field("host", &self.base.host_str())
            .field("log_requests", &self.log_requests)
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &KlipyConfig, pipeline: RequestPipeline) -> Result<Self> {
        let base = api_base_url(&config.base_url, &config.secret_key)?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, base, pipeline, log_requests: config.enable_logging })
    }

    /// Append `segments` under the base url, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(dots) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(KlipyError::Config(format!("path segment {dots:?} is not allowed")));
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| KlipyError::Config("base url cannot carry path segments".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn build(&self, method: Method, segments: &[&str], query: &[(&str, String)], body: Option<Vec<u8>>) -> Result<Request> {
        let mut url = self.url(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.header(reqwest::header::CONTENT_TYPE, "application/json").body(body);
        }
        Ok(builder.build()?)
    }

    /// Send through the pipeline; non-2xx and empty bodies are errors.
    async fn execute(&self, endpoint: Endpoint, mut request: Request) -> Result<Vec<u8>> {
        self.pipeline.apply(endpoint, &mut request);
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(?endpoint, %method, url = %redact(request.url()), "sending request");

        let started = Instant::now();
        let response = self.client.execute(request).await?;
        let status = response.status();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if self.log_requests {
            info!(%method, path = %redact_path(&path), status = status.as_u16(), elapsed_ms, "request finished");
        } else {
            debug!(%method, status = status.as_u16(), elapsed_ms, "request finished");
        }

        let label = format!("{endpoint:?}");
        if !status.is_success() {
            return Err(KlipyError::Status { endpoint: label, status });
        }
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(KlipyError::EmptyBody(label));
        }
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint, segments: &[&str], query: &[(&str, String)]) -> Result<T> {
        let request = self.build(Method::GET, segments, query, None)?;
        let body = self.execute(endpoint, request).await?;
        serde_json::from_slice(&body).map_err(|e| KlipyError::Decode(DecodeError::Json(e)))
    }

    async fn send_unit<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<()> {
        let body = body.map(serde_json::to_vec).transpose().map_err(DecodeError::from)?;
        let request = self.build(method, segments, query, body)?;
        self.execute(endpoint, request).await.map(|_| ())
    }
}

fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_path(&redact_path(url.path()));
    shown.to_string()
}

/// Hide the secret key path segment (`/api/v1/{key}/...`).
fn redact_path(path: &str) -> String {
    let mut segments: Vec<&str> = path.split('/').collect();
    let is_version = |s: &&str| s.len() > 1 && s.starts_with('v') && s[1..].chars().all(|c| c.is_ascii_digit());
    if let Some(idx) = segments.iter().position(is_version) {
        if let Some(seg) = segments.get_mut(idx + 1) {
            *seg = "***";
        }
    }
    segments.join("/")
}

/// reqwest-backed catalog API for one category-group.
#[derive(Debug, Clone)]
pub struct HttpMediaService {
    api: ApiClient,
    group: &'static str,
}

impl HttpMediaService {
    pub fn new(api: ApiClient, category: ContentCategory) -> Result<Self> {
        let group = category.path_segment().ok_or(KlipyError::UnroutableCategory(category))?;
        Ok(Self { api, group })
    }
}

#[async_trait]
impl MediaService for HttpMediaService {
    async fn categories(&self) -> Result<CategoriesResponseDto> {
        self.api.get_json(Endpoint::Categories, &[self.group, "categories"], &[]).await
    }

    async fn trending(&self, page: u32, per_page: u32, customer_id: &str) -> Result<MediaItemResponseDto> {
        let query = [("page", page.to_string()), ("per_page", per_page.to_string()), ("customer_id", customer_id.to_string())];
        self.api.get_json(Endpoint::Trending, &[self.group, "trending"], &query).await
    }

    async fn recent(&self, customer_id: &str, page: u32, per_page: u32) -> Result<MediaItemResponseDto> {
        let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
        self.api.get_json(Endpoint::Recent, &[self.group, "recent", customer_id], &query).await
    }

    async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<MediaItemResponseDto> {
        let params = [("q", query.to_string()), ("page", page.to_string()), ("per_page", per_page.to_string())];
        self.api.get_json(Endpoint::Search, &[self.group, "search"], &params).await
    }

    async fn items(&self, ids: &str, slugs: &str) -> Result<MediaItemResponseDto> {
        let query = [("ids", ids.to_string()), ("slugs", slugs.to_string())];
        self.api.get_json(Endpoint::Items, &[self.group, "items"], &query).await
    }

    async fn share(&self, slug: &str, customer_id: &str) -> Result<()> {
        let body = TriggerViewRequestDto { customer_id };
        self.api.send_unit(Endpoint::Share, Method::POST, &[self.group, "share", slug], &[], Some(&body)).await
    }

    async fn view(&self, slug: &str, customer_id: &str) -> Result<()> {
        let body = TriggerViewRequestDto { customer_id };
        self.api.send_unit(Endpoint::View, Method::POST, &[self.group, "view", slug], &[], Some(&body)).await
    }

    async fn report(&self, slug: &str, customer_id: &str, reason: &str) -> Result<()> {
        let body = ReportRequestDto { customer_id, reason };
        self.api.send_unit(Endpoint::Report, Method::POST, &[self.group, "report", slug], &[], Some(&body)).await
    }

    async fn hide_from_recent(&self, customer_id: &str, slug: &str) -> Result<()> {
        let query = [("slug", slug.to_string())];
        self.api
            .send_unit::<()>(Endpoint::HideFromRecent, Method::DELETE, &[self.group, "recent", customer_id], &query, None)
            .await
    }
}
