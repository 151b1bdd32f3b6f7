pub mod categories;
pub mod client;
pub mod config;
pub mod device;
pub mod dto;
pub mod error;
pub mod mapping;
pub mod middleware;
pub mod paging;
pub mod router;
pub mod service;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::config::KlipyConfig;
    pub use crate::device::{DeviceInfoProvider, DeviceProfile};
    pub use crate::error::{KlipyError, Result};
    pub use crate::paging::{RECENT, TRENDING};
    pub use crate::types::{Category, ContentCategory, MediaItem, MediaPage, MediaVariant};
    pub use crate::Klipy;
}

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::categories::CategoryCache;
use crate::client::{ApiClient, HttpMediaService};
use crate::config::KlipyConfig;
use crate::device::DeviceInfoProvider;
use crate::error::{KlipyError, Result};
use crate::mapping::media_page_from;
use crate::middleware::RequestPipeline;
use crate::router::CategoryRouter;
use crate::service::{Services, PER_PAGE};
use crate::types::{Category, ContentCategory, MediaPage};

/// Entry point of the SDK: paged media, categories and feedback calls per category-group.
///
/// Construct one at startup and hand it to whatever drives the UI; it owns one paging
/// engine per group for its whole lifetime.
#[derive(Debug)]
pub struct Klipy {
    services: Services,
    router: CategoryRouter,
    categories: CategoryCache,
    customer_id: String,
}

impl Klipy {
    /// Build the HTTP stack from configuration.
    pub fn connect(mut config: KlipyConfig) -> Result<Self> {
        if config.secret_key.trim().is_empty() {
            return Err(KlipyError::Config("a secret key is required".into()));
        }
        config.device = config.device.ensure_installation_id();
        let device: Arc<dyn DeviceInfoProvider> = Arc::new(config.device.clone());
        let api = ApiClient::new(&config, RequestPipeline::standard(device.clone()))?;

        let services = Services {
            gifs: Arc::new(HttpMediaService::new(api.clone(), ContentCategory::Gif)?),
            stickers: Arc::new(HttpMediaService::new(api.clone(), ContentCategory::Sticker)?),
            clips: Arc::new(HttpMediaService::new(api.clone(), ContentCategory::Clip)?),
            memes: Arc::new(HttpMediaService::new(api, ContentCategory::Meme)?),
        };
        info!(base_url = %config.base_url, "klipy client ready");
        Ok(Self::with_services(services, device.device_id()))
    }

    /// Assemble from explicit per-group services.
    pub fn with_services(services: Services, customer_id: impl Into<String>) -> Self {
        let customer_id = customer_id.into();
        Self {
            router: CategoryRouter::new(&services, &customer_id),
            categories: CategoryCache::new(&services),
            services,
            customer_id,
        }
    }

    pub fn available_categories(&self) -> Vec<ContentCategory> {
        ContentCategory::PAGEABLE.to_vec()
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub async fn get_categories(&self, group: ContentCategory) -> Result<Vec<Category>> {
        self.categories.get_categories(group).await
    }

    /// Warm the category cache of every group concurrently. Dropping the future cancels it.
    pub async fn prefetch_categories(&self) {
        let fetches = ContentCategory::PAGEABLE.map(|group| async move { (group, self.get_categories(group).await) });
        for (group, outcome) in join_all(fetches).await {
            if let Err(e) = outcome {
                warn!(%group, error = %e, "category prefetch failed");
            }
        }
    }

    /// Next page for `filter` ("trending", "recent" or a search term) in `group`.
    pub async fn get_media(&self, group: ContentCategory, filter: &str) -> Result<MediaPage> {
        self.router.route(group).await?.fetch_page(filter).await
    }

    /// One-shot lookup by ids and/or slugs, outside of pagination.
    pub async fn get_items(&self, group: ContentCategory, ids: &[String], slugs: &[String]) -> Result<MediaPage> {
        let service = self.services.for_group(group)?;
        if ids.is_empty() && slugs.is_empty() {
            return Ok(MediaPage::empty());
        }
        let response = service.items(&ids.join(","), &slugs.join(",")).await?;
        Ok(media_page_from(response).0)
    }

    /// First trending page, leaving paging state alone.
    pub async fn trending(&self, group: ContentCategory) -> Result<MediaPage> {
        let response = self.services.for_group(group)?.trending(1, PER_PAGE, &self.customer_id).await?;
        Ok(media_page_from(response).0)
    }

    /// First page of this installation's recent items, leaving paging state alone.
    pub async fn recent(&self, group: ContentCategory) -> Result<MediaPage> {
        let response = self.services.for_group(group)?.recent(&self.customer_id, 1, PER_PAGE).await?;
        Ok(media_page_from(response).0)
    }

    /// First search page, leaving paging state alone.
    pub async fn search(&self, group: ContentCategory, query: &str) -> Result<MediaPage> {
        let response = self.services.for_group(group)?.search(query, 1, PER_PAGE).await?;
        Ok(media_page_from(response).0)
    }

    pub async fn trigger_share(&self, group: ContentCategory, slug: &str) -> Result<()> {
        self.services.for_group(group)?.share(slug, &self.customer_id).await
    }

    pub async fn trigger_view(&self, group: ContentCategory, slug: &str) -> Result<()> {
        self.services.for_group(group)?.view(slug, &self.customer_id).await
    }

    pub async fn report(&self, group: ContentCategory, slug: &str, reason: &str) -> Result<()> {
        self.services.for_group(group)?.report(slug, &self.customer_id, reason).await
    }

    pub async fn hide_from_recent(&self, group: ContentCategory, slug: &str) -> Result<()> {
        self.services.for_group(group)?.hide_from_recent(&self.customer_id, slug).await
    }

    /// Restart pagination of `group` without changing the active group.
    pub async fn reset(&self, group: ContentCategory) -> Result<()> {
        self.router.engine(group)?.reset().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fake::{gif_items, Call, FakeService};

    struct Fixture {
        gifs: Arc<FakeService>,
        stickers: Arc<FakeService>,
        klipy: Klipy,
    }

    fn fixture() -> Fixture {
        let gifs = FakeService::new();
        let stickers = FakeService::new();
        let services = Services { gifs: gifs.clone(), stickers: stickers.clone(), clips: FakeService::new(), memes: FakeService::new() };
        Fixture { gifs, stickers, klipy: Klipy::with_services(services, "install-1") }
    }

    #[tokio::test]
    async fn get_media_pages_through_the_router() {
        let f = fixture();
        f.gifs.push_page(gif_items("a", 50), Some(true));
        f.gifs.push_page(vec![], Some(false));

        assert_eq!(f.klipy.get_media(ContentCategory::Gif, "trending").await.unwrap().items.len(), 50);
        assert!(f.klipy.get_media(ContentCategory::Gif, "trending").await.unwrap().is_empty());
        assert!(f.klipy.get_media(ContentCategory::Gif, "trending").await.unwrap().is_empty());
        assert_eq!(f.gifs.network_calls(), 2);
    }

    #[tokio::test]
    async fn switching_back_to_a_group_starts_over() {
        let f = fixture();
        f.gifs.push_page(gif_items("a", 5), Some(true));
        f.stickers.push_page(gif_items("s", 5), Some(true));
        f.gifs.push_page(gif_items("b", 5), Some(true));

        f.klipy.get_media(ContentCategory::Gif, "cats").await.unwrap();
        f.klipy.get_media(ContentCategory::Sticker, "cats").await.unwrap();
        f.klipy.get_media(ContentCategory::Gif, "cats").await.unwrap();

        let pages: Vec<_> = f
            .gifs
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search { page, .. } => Some(page),
                _ => None,
            })
            .collect();
        assert_eq!(pages, vec![1, 1]);
    }

    #[tokio::test]
    async fn explicit_reset_keeps_the_active_group() {
        let f = fixture();
        f.gifs.push_page(gif_items("a", 5), Some(true));
        f.gifs.push_page(gif_items("b", 5), Some(true));

        f.klipy.get_media(ContentCategory::Gif, "trending").await.unwrap();
        f.klipy.reset(ContentCategory::Gif).await.unwrap();
        f.klipy.get_media(ContentCategory::Gif, "trending").await.unwrap();

        assert!(matches!(f.gifs.calls()[1], Call::Trending { page: 1, .. }));
        assert_eq!(f.klipy.router.last_group(), Some(ContentCategory::Gif));
    }

    #[tokio::test]
    async fn get_items_joins_ids_and_skips_empty_lookups() {
        let f = fixture();
        f.gifs.push_page(gif_items("i", 2), None);

        assert!(f.klipy.get_items(ContentCategory::Gif, &[], &[]).await.unwrap().is_empty());
        let page = f
            .klipy
            .get_items(ContentCategory::Gif, &["1".into(), "2".into()], &["funny-cat".into()])
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(f.gifs.calls(), vec![Call::Items { ids: "1,2".into(), slugs: "funny-cat".into() }]);
    }

    #[tokio::test]
    async fn side_effects_carry_the_customer_id() {
        let f = fixture();
        f.klipy.trigger_share(ContentCategory::Sticker, "party-hat").await.unwrap();
        f.klipy.trigger_view(ContentCategory::Sticker, "party-hat").await.unwrap();
        f.klipy.report(ContentCategory::Sticker, "party-hat", "spam").await.unwrap();
        f.klipy.hide_from_recent(ContentCategory::Sticker, "party-hat").await.unwrap();

        assert_eq!(
            f.stickers.calls(),
            vec![
                Call::Share { slug: "party-hat".into(), customer_id: "install-1".into() },
                Call::View { slug: "party-hat".into(), customer_id: "install-1".into() },
                Call::Report { slug: "party-hat".into(), customer_id: "install-1".into(), reason: "spam".into() },
                Call::HideFromRecent { customer_id: "install-1".into(), slug: "party-hat".into() },
            ]
        );
    }

    #[tokio::test]
    async fn ad_category_is_rejected_before_any_request() {
        let f = fixture();
        assert!(matches!(f.klipy.get_media(ContentCategory::Ad, "trending").await, Err(KlipyError::UnroutableCategory(_))));
        assert!(matches!(f.klipy.trigger_view(ContentCategory::Ad, "x").await, Err(KlipyError::UnroutableCategory(_))));
        assert!(matches!(f.klipy.reset(ContentCategory::Ad).await, Err(KlipyError::UnroutableCategory(_))));
        assert_eq!(f.gifs.network_calls() + f.stickers.network_calls(), 0);
    }

    #[tokio::test]
    async fn one_shot_lookups_leave_paging_alone() {
        let f = fixture();
        f.gifs.push_page(gif_items("t", 3), Some(true));
        f.gifs.push_page(gif_items("p", 3), Some(true));

        assert_eq!(f.klipy.trending(ContentCategory::Gif).await.unwrap().items.len(), 3);
        f.klipy.get_media(ContentCategory::Gif, "trending").await.unwrap();

        assert!(matches!(f.gifs.calls()[1], Call::Trending { page: 1, .. }));
    }

    #[tokio::test]
    async fn prefetch_warms_every_group_and_tolerates_failures() {
        let f = fixture();
        f.gifs.push_categories(&["love"]);
        f.stickers.push_categories_failure();

        f.klipy.prefetch_categories().await;

        assert!(f.klipy.categories.is_cached(ContentCategory::Gif));
        assert!(!f.klipy.categories.is_cached(ContentCategory::Sticker));
        f.klipy.get_categories(ContentCategory::Gif).await.unwrap();
        assert_eq!(f.gifs.network_calls(), 1);
    }

    #[test]
    fn connect_requires_a_secret_key() {
        assert!(matches!(Klipy::connect(KlipyConfig::default()), Err(KlipyError::Config(_))));
    }

    #[test]
    fn connect_builds_all_groups() {
        let klipy = Klipy::connect(KlipyConfig::with_secret_key("secret")).unwrap();
        assert_eq!(klipy.available_categories().len(), 4);
        assert!(!klipy.customer_id().is_empty());
    }
}
