use std::sync::Arc;

use async_trait::async_trait;

use crate::dto::{CategoriesResponseDto, MediaItemResponseDto};
use crate::error::{KlipyError, Result};
use crate::types::ContentCategory;

/// Items requested per page.
pub const PER_PAGE: u32 = 50;

/// Operations of one endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Categories,
    Trending,
    Recent,
    Search,
    Items,
    Share,
    View,
    Report,
    HideFromRecent,
}

impl Endpoint {
    /// Ad-aware endpoints get device/targeting parameters injected.
    pub fn is_ad_aware(self) -> bool {
        matches!(self, Endpoint::Trending | Endpoint::Recent | Endpoint::Search)
    }
}

/// Catalog API of one category-group.
#[async_trait]
pub trait MediaService: Send + Sync {
    async fn categories(&self) -> Result<CategoriesResponseDto>;
    async fn trending(&self, page: u32, per_page: u32, customer_id: &str) -> Result<MediaItemResponseDto>;
    async fn recent(&self, customer_id: &str, page: u32, per_page: u32) -> Result<MediaItemResponseDto>;
    async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<MediaItemResponseDto>;
    /// `ids` and `slugs` are comma-joined lists.
    async fn items(&self, ids: &str, slugs: &str) -> Result<MediaItemResponseDto>;
    async fn share(&self, slug: &str, customer_id: &str) -> Result<()>;
    async fn view(&self, slug: &str, customer_id: &str) -> Result<()>;
    async fn report(&self, slug: &str, customer_id: &str, reason: &str) -> Result<()>;
    async fn hide_from_recent(&self, customer_id: &str, slug: &str) -> Result<()>;
}

/// One service per pageable category-group.
#[derive(Clone)]
pub struct Services {
    pub gifs: Arc<dyn MediaService>,
    pub stickers: Arc<dyn MediaService>,
    pub clips: Arc<dyn MediaService>,
    pub memes: Arc<dyn MediaService>,
}

impl Services {
    pub fn for_group(&self, group: ContentCategory) -> Result<&Arc<dyn MediaService>> {
        match group {
            ContentCategory::Gif => Ok(&self.gifs),
            ContentCategory::Sticker => Ok(&self.stickers),
            ContentCategory::Clip => Ok(&self.clips),
            ContentCategory::Meme => Ok(&self.memes),
            ContentCategory::Ad => Err(KlipyError::UnroutableCategory(group)),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
