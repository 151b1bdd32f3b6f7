use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::mapping::media_page_from;
use crate::service::{MediaService, PER_PAGE};
use crate::types::{ContentCategory, MediaPage};

pub const RECENT: &str = "recent";
pub const TRENDING: &str = "trending";

const INITIAL_PAGE: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PagingState {
    pub(crate) current_page: u32,
    pub(crate) current_filter: String,
    pub(crate) can_load_more: bool,
}

impl Default for PagingState {
    fn default() -> Self {
        Self { current_page: INITIAL_PAGE, current_filter: String::new(), can_load_more: true }
    }
}

/// What a filter string asks the catalog for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind<'a> {
    Recent,
    Trending,
    Search(&'a str),
}

impl<'a> FilterKind<'a> {
    pub fn parse(filter: &'a str) -> Self {
        match filter {
            RECENT => FilterKind::Recent,
            TRENDING => FilterKind::Trending,
            query => FilterKind::Search(query),
        }
    }
}

/// Pagination over one category-group.
///
/// Every call with the same filter loads the next page. A new filter restarts from the
/// first page. An empty or failed page closes the filter until [`PagingEngine::reset`]
/// or a filter change, after which calls return an empty page without touching the network.
/// The state lock is held across the request, so concurrent callers are served in turn.
pub struct PagingEngine {
    group: ContentCategory,
    service: Arc<dyn MediaService>,
    customer_id: String,
    state: Mutex<PagingState>,
}

impl PagingEngine {
    pub fn new(group: ContentCategory, service: Arc<dyn MediaService>, customer_id: impl Into<String>) -> Self {
        Self { group, service, customer_id: customer_id.into(), state: Mutex::new(PagingState::default()) }
    }

    pub fn group(&self) -> ContentCategory {
        self.group
    }

    pub async fn fetch_page(&self, filter: &str) -> Result<MediaPage> {
        if filter.is_empty() {
            return Ok(MediaPage::empty());
        }

        let mut state = self.state.lock().await;
        if state.current_filter != filter {
            state.current_page = INITIAL_PAGE;
            state.can_load_more = true;
            state.current_filter = filter.to_string();
        }
        state.current_page += 1;

        if !state.can_load_more {
            debug!(group = %self.group, filter, "no more pages; skipping request");
            return Ok(MediaPage::empty());
        }

        let page = state.current_page;
        let response = match FilterKind::parse(filter) {
            FilterKind::Recent => self.service.recent(&self.customer_id, page, PER_PAGE).await,
            FilterKind::Trending => self.service.trending(page, PER_PAGE, &self.customer_id).await,
            FilterKind::Search(query) => self.service.search(query, page, PER_PAGE).await,
        };

        match response {
            Ok(response) => {
                let (media, has_next) = media_page_from(response);
                state.can_load_more = !media.is_empty() && has_next.unwrap_or(true);
                debug!(group = %self.group, filter, page, items = media.items.len(), can_load_more = state.can_load_more, "page loaded");
                Ok(media)
            }
            Err(e) => {
                state.can_load_more = false;
                warn!(group = %self.group, filter, page, error = %e, "page request failed; pagination closed until reset");
                Err(e)
            }
        }
    }

    pub async fn reset(&self) {
        *self.state.lock().await = PagingState::default();
    }

    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> PagingState {
        self.state.lock().await.clone()
    }

    /// Lock the state as an in-flight fetch would.
    #[cfg(test)]
    pub(crate) async fn hold(&self) -> tokio::sync::MutexGuard<'_, PagingState> {
        self.state.lock().await
    }
}

impl std::fmt::Debug for PagingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagingEngine").field("group", &self.group).finish_non_exhaustive()
    }
}
