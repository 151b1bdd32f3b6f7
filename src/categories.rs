use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{KlipyError, Result};
use crate::mapping::categories_from;
use crate::service::{MediaService, Services};
use crate::types::{Category, ContentCategory};

/// Why a cache slot stayed empty.
enum Unfilled {
    Empty,
    Failed(KlipyError),
}

/// Fetch-once category lists per group. Only non-empty successes are memoized.
pub struct CategoryCache {
    slots: HashMap<ContentCategory, (Arc<dyn MediaService>, OnceCell<Vec<Category>>)>,
}

impl CategoryCache {
    pub fn new(services: &Services) -> Self {
        let slots = ContentCategory::PAGEABLE
            .into_iter()
            .filter_map(|group| {
                let service = services.for_group(group).ok()?.clone();
                Some((group, (service, OnceCell::new())))
            })
            .collect();
        Self { slots }
    }

    pub async fn get_categories(&self, group: ContentCategory) -> Result<Vec<Category>> {
        let (service, cell) = self.slots.get(&group).ok_or(KlipyError::UnroutableCategory(group))?;
        if let Some(cached) = cell.get() {
            debug!(%group, "categories served from cache");
            return Ok(cached.clone());
        }
        let filled = cell
            .get_or_try_init(|| async {
                let categories = categories_from(service.categories().await.map_err(Unfilled::Failed)?);
                if categories.is_empty() {
                    return Err(Unfilled::Empty);
                }
                Ok(categories)
            })
            .await;
        match filled {
            Ok(categories) => Ok(categories.clone()),
            Err(Unfilled::Empty) => {
                debug!(%group, "empty category list; not cached");
                Ok(Vec::new())
            }
            Err(Unfilled::Failed(e)) => Err(e),
        }
    }

    pub fn is_cached(&self, group: ContentCategory) -> bool {
        self.slots.get(&group).is_some_and(|(_, cell)| cell.initialized())
    }
}

impl std::fmt::Debug for CategoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached: Vec<_> = self.slots.iter().filter(|(_, (_, c))| c.initialized()).map(|(g, _)| *g).collect();
        f.debug_struct("CategoryCache").field("cached", &cached).finish()
    }
}
