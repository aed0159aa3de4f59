//! Listings Orchestrator — the read-through path behind `GET /api/v1/listings`.
//!
//! Serves one page of internship listings by reading the ranked cache first
//! and topping up from the live scraper only when the page is not fully
//! cached. Freshly scraped listings go back into the cache on a detached
//! task so the response never waits on the write.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::listings::cache::{preference_key, ListingCache};
use crate::listings::model::{dedupe, Listing};
use crate::listings::preferences::{PreferenceError, PreferenceStore};
use crate::listings::scraper::{ListingSource, ScraperUnavailable};

/// Failure kinds callers must handle distinctly. Cache failures never appear
/// here: they are absorbed at the store and degrade to cache-miss behavior.
#[derive(Debug, Error)]
pub enum ListingsError {
    /// No résumé was ever parsed for this user, so there is no role
    /// preference to search with. Fixed by completing onboarding.
    #[error("user has not completed onboarding")]
    PreferenceNotSet,

    #[error(transparent)]
    ScraperUnavailable(#[from] ScraperUnavailable),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<PreferenceError> for ListingsError {
    fn from(e: PreferenceError) -> Self {
        match e {
            PreferenceError::NotSet => ListingsError::PreferenceNotSet,
            PreferenceError::Database(e) => ListingsError::Database(e),
        }
    }
}

pub struct ListingsOrchestrator {
    prefs: Arc<dyn PreferenceStore>,
    cache: Arc<dyn ListingCache>,
    source: Arc<dyn ListingSource>,
}

impl ListingsOrchestrator {
    pub fn new(
        prefs: Arc<dyn PreferenceStore>,
        cache: Arc<dyn ListingCache>,
        source: Arc<dyn ListingSource>,
    ) -> Self {
        Self {
            prefs,
            cache,
            source,
        }
    }

    /// Returns one page of listings for the user, cache-first.
    ///
    /// Within a request the cache read always precedes any scrape, and the
    /// response is built from the merge below — never from re-reading the
    /// cache after population.
    pub async fn get_listings(
        &self,
        user_id: Uuid,
        industry: Option<&str>,
        page: usize,
        cache_page_size: usize,
        job_portal_count: usize,
    ) -> Result<Vec<Listing>, ListingsError> {
        let preference = self.prefs.get_preference(user_id).await?;
        let industry = industry.map(str::to_lowercase);
        let key = preference_key(&preference, industry.as_deref());

        let cache_start = page * cache_page_size;
        let cache_end = cache_start + cache_page_size;
        let cached = self.cache.read_range(&key, cache_start, cache_end).await;
        let hit_count = cached.len();
        debug!(hit_count, cache_start, cache_end, "cache window for '{key}'");

        if hit_count == cache_page_size {
            // Full page served from cache: no scrape, no write.
            return Ok(cached);
        }

        let (api_start, api_end) =
            scrape_window(page, hit_count, cache_page_size, job_portal_count);
        let scraped = self
            .source
            .fetch(&preference, api_start, api_end, industry.as_deref())
            .await?;
        info!(
            "cache had {hit_count}/{cache_page_size} for '{key}', scraped {} more",
            scraped.len()
        );

        // Population is detached from the request: it keeps running if the
        // client disconnects, and its failures never reach the caller.
        let cache = Arc::clone(&self.cache);
        let batch = scraped.clone();
        tokio::spawn(async move {
            cache.append(&key, &batch).await;
        });

        let mut merged = cached;
        merged.extend(scraped);
        Ok(dedupe(merged))
    }
}

/// Complementary provider window for a partially cached page.
///
/// The scraper fans one call out across `job_portal_count` boards, so its
/// offsets are scaled down by the portal count. The cached prefix advances
/// the start so already-cached listings are not refetched, without leaving
/// a gap before the page's end.
fn scrape_window(
    page: usize,
    hit_count: usize,
    cache_page_size: usize,
    job_portal_count: usize,
) -> (usize, usize) {
    let per_portal = cache_page_size / job_portal_count;
    let api_start = page * per_portal + hit_count / job_portal_count;
    let api_end = (page * cache_page_size + cache_page_size) / job_portal_count;
    (api_start, api_end)
}
