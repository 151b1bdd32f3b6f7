use std::sync::Mutex;

use tracing::debug;

use crate::error::{KlipyError, Result};
use crate::paging::PagingEngine;
use crate::service::Services;
use crate::types::ContentCategory;

/// Hands out the paging engine of a group, resetting it when the active group changes.
#[derive(Debug)]
pub struct CategoryRouter {
    gifs: PagingEngine,
    stickers: PagingEngine,
    clips: PagingEngine,
    memes: PagingEngine,
    last_group: Mutex<Option<ContentCategory>>,
}

impl CategoryRouter {
    pub fn new(services: &Services, customer_id: &str) -> Self {
        Self {
            gifs: PagingEngine::new(ContentCategory::Gif, services.gifs.clone(), customer_id),
            stickers: PagingEngine::new(ContentCategory::Sticker, services.stickers.clone(), customer_id),
            clips: PagingEngine::new(ContentCategory::Clip, services.clips.clone(), customer_id),
            memes: PagingEngine::new(ContentCategory::Meme, services.memes.clone(), customer_id),
            last_group: Mutex::new(None),
        }
    }

    /// Engine of `group` without touching the active group.
    pub fn engine(&self, group: ContentCategory) -> Result<&PagingEngine> {
        match group {
            ContentCategory::Gif => Ok(&self.gifs),
            ContentCategory::Sticker => Ok(&self.stickers),
            ContentCategory::Clip => Ok(&self.clips),
            ContentCategory::Meme => Ok(&self.memes),
            ContentCategory::Ad => Err(KlipyError::UnroutableCategory(group)),
        }
    }

    /// Switching into a group resets that group's engine; the one switched away from keeps its state.
    ///
    /// The active group only changes once the reset has completed, so a dropped call leaves
    /// the next one to reset again.
    pub async fn route(&self, group: ContentCategory) -> Result<&PagingEngine> {
        let engine = self.engine(group)?;
        if self.last_group() != Some(group) {
            debug!(%group, "active category changed; resetting its pagination");
            engine.reset().await;
            *self.last_group.lock().unwrap_or_else(|e| e.into_inner()) = Some(group);
        }
        Ok(engine)
    }

    pub fn last_group(&self) -> Option<ContentCategory> {
        *self.last_group.lock().unwrap_or_else(|e| e.into_inner())
    }
}
