//! Scrape Client — the single point of entry for external job-board calls.
//!
//! The provider integration is blocking (HTML fetching and parsing with no
//! async form), so every call is dispatched to a worker thread via
//! `spawn_blocking` and bounded by a hard wall-clock timeout. The rest of
//! the service only ever sees `ScraperUnavailable`; provider-specific
//! failures stop here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::listings::model::{dedupe, Listing};

/// Hard wall-clock bound on one provider call. On expiry the request fails
/// with `ScraperUnavailable` instead of hanging the caller.
pub const SCRAPE_TIMEOUT: Duration = Duration::from_secs(60);

/// Recency window requested from the boards: three weeks, in hours.
const MAX_LISTING_AGE_HOURS: u32 = 24 * 7 * 3;

const TARGET_REGION: &str = "Singapore";

/// Boards queried per scrape call. `JOB_PORTAL_COUNT` in config scales the
/// orchestrator's per-call result window and must match this list's length.
const PORTAL_SITES: &[&str] = &["linkedin", "indeed"];

/// The upstream job-board integration is down, erroring, or too slow.
/// Safe for the caller to retry after a backoff.
#[derive(Debug, Error)]
#[error("job scraper unavailable: {0}")]
pub struct ScraperUnavailable(pub String);

/// Source of fresh listings, consumed by the orchestrator.
/// Carried as `Arc<dyn ListingSource>` so tests can substitute a stub.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetches the `[start, end)` offset window of listings matching the
    /// user's preference and optional industry qualifier.
    async fn fetch(
        &self,
        preference: &str,
        start: usize,
        end: usize,
        industry: Option<&str>,
    ) -> Result<Vec<Listing>, ScraperUnavailable>;
}

/// Query handed to a job-board provider. One call fans out across every
/// site in `sites`; `results_wanted` is the per-call total.
#[derive(Debug, Clone)]
pub struct ScrapeQuery {
    pub search_term: String,
    pub offset: usize,
    pub results_wanted: usize,
    pub location: &'static str,
    pub hours_old: u32,
    pub sites: &'static [&'static str],
}

/// Raw tabular row from the provider. Every column may be absent or carry
/// the provider's missing-value sentinel; `into_listing` is the boundary
/// where sentinels become honest `None`s.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderRow {
    /// Originating board; carried by the provider schema but not part of
    /// the domain Listing.
    #[allow(dead_code)]
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub date_posted: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_remote: Option<bool>,
    #[serde(default)]
    pub company_industry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProviderRow {
    /// Builds a domain Listing, or `None` when the row has no usable URL.
    fn into_listing(self) -> Option<Listing> {
        let job_url = non_empty(self.job_url)?;
        Some(Listing {
            company: non_empty(self.company),
            job_url,
            title: non_empty(self.title),
            date_posted: self.date_posted,
            is_remote: self.is_remote,
            company_industry: non_empty(self.company_industry),
            description: non_empty(self.description),
        })
    }
}

/// Maps the provider's missing-value sentinels (null, "", "NaN") to None.
fn non_empty(value: Option<String>) -> Option<String> {
    match value {
        Some(s) if !s.trim().is_empty() && s.trim() != "NaN" => Some(s),
        _ => None,
    }
}

/// Blocking call into a job-board integration. Implementations run on a
/// worker thread, never on the runtime's reactor. Any error here is
/// provider-specific and gets collapsed to `ScraperUnavailable` above.
pub trait JobBoardProvider: Send + Sync {
    fn scrape(&self, query: &ScrapeQuery) -> anyhow::Result<Vec<ProviderRow>>;
}

fn search_term(preference: &str, industry: Option<&str>) -> String {
    const KEYWORDS: &str =
        "(intern OR internship OR co-op OR 'summer intern' OR 'summer analyst')";
    match industry {
        Some(industry) => format!("{industry} {preference} {KEYWORDS}"),
        None => format!("{preference} {KEYWORDS}"),
    }
}

/// Async wrapper around a blocking `JobBoardProvider`.
pub struct ScrapeClient {
    provider: Arc<dyn JobBoardProvider>,
    timeout: Duration,
}

impl ScrapeClient {
    pub fn new(provider: Arc<dyn JobBoardProvider>) -> Self {
        Self {
            provider,
            timeout: SCRAPE_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(provider: Arc<dyn JobBoardProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

#[async_trait]
impl ListingSource for ScrapeClient {
    async fn fetch(
        &self,
        preference: &str,
        start: usize,
        end: usize,
        industry: Option<&str>,
    ) -> Result<Vec<Listing>, ScraperUnavailable> {
        let query = ScrapeQuery {
            search_term: search_term(preference, industry),
            offset: start,
            results_wanted: end.saturating_sub(start),
            location: TARGET_REGION,
            hours_old: MAX_LISTING_AGE_HOURS,
            sites: PORTAL_SITES,
        };
        info!(start, end, "dispatching scrape for '{}'", query.search_term);

        let provider = Arc::clone(&self.provider);
        let call = tokio::task::spawn_blocking(move || provider.scrape(&query));

        let rows = match tokio::time::timeout(self.timeout, call).await {
            Err(_) => {
                error!("job-board provider took too long to respond");
                return Err(ScraperUnavailable("provider call timed out".to_string()));
            }
            Ok(Err(join_err)) => {
                error!("scrape worker failed: {join_err}");
                return Err(ScraperUnavailable("scrape worker failed".to_string()));
            }
            Ok(Ok(Err(provider_err))) => {
                error!("scraper encountered issue: {provider_err:#}");
                return Err(ScraperUnavailable(provider_err.to_string()));
            }
            Ok(Ok(Ok(rows))) => rows,
        };

        // First occurrence wins within a single batch.
        let listings = dedupe(
            rows.into_iter()
                .filter_map(ProviderRow::into_listing)
                .collect(),
        );
        info!("scraper returned {} listings", listings.len());
        Ok(listings)
    }
}

/// `JobBoardProvider` backed by a JobSpy-compatible scraping sidecar over
/// HTTP, returning the listings of all portals as one JSON array of rows.
pub struct HttpJobBoard {
    base_url: String,
}

impl HttpJobBoard {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

impl JobBoardProvider for HttpJobBoard {
    fn scrape(&self, query: &ScrapeQuery) -> anyhow::Result<Vec<ProviderRow>> {
        // The blocking client owns its own runtime, which must live on this
        // worker thread rather than in async context, so it is built per call.
        let client = reqwest::blocking::Client::builder()
            .timeout(SCRAPE_TIMEOUT)
            .build()?;

        let response = client
            .get(format!("{}/scrape", self.base_url))
            .query(&[
                ("site_name", query.sites.join(",")),
                ("search_term", query.search_term.clone()),
                ("location", query.location.to_string()),
                ("results_wanted", query.results_wanted.to_string()),
                ("hours_old", query.hours_old.to_string()),
                ("offset", query.offset.to_string()),
                ("description_format", "html".to_string()),
            ])
            .send()?
            .error_for_status()?;

        let rows: Vec<ProviderRow> = response.json()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(url: Option<&str>, company: Option<&str>) -> ProviderRow {
        ProviderRow {
            site: Some("linkedin".to_string()),
            job_url: url.map(str::to_string),
            title: Some("Intern".to_string()),
            company: company.map(str::to_string),
            date_posted: None,
            is_remote: Some(false),
            company_industry: None,
            description: Some("desc".to_string()),
        }
    }

    struct FixedProvider(Vec<ProviderRow>);

    impl JobBoardProvider for FixedProvider {
        fn scrape(&self, _query: &ScrapeQuery) -> anyhow::Result<Vec<ProviderRow>> {
            Ok(self.0.clone())
        }
    }

    struct SleepyProvider(Duration);

    impl JobBoardProvider for SleepyProvider {
        fn scrape(&self, _query: &ScrapeQuery) -> anyhow::Result<Vec<ProviderRow>> {
            std::thread::sleep(self.0);
            Ok(Vec::new())
        }
    }

    struct BrokenProvider;

    impl JobBoardProvider for BrokenProvider {
        fn scrape(&self, _query: &ScrapeQuery) -> anyhow::Result<Vec<ProviderRow>> {
            anyhow::bail!("upstream returned 403")
        }
    }

    #[test]
    fn test_search_term_without_industry() {
        assert_eq!(
            search_term("Backend", None),
            "Backend (intern OR internship OR co-op OR 'summer intern' OR 'summer analyst')"
        );
    }

    #[test]
    fn test_search_term_with_industry_qualifier() {
        let term = search_term("Data Science", Some("finance"));
        assert!(term.starts_with("finance Data Science (intern OR"));
    }

    #[test]
    fn test_sentinels_become_none() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("".to_string())), None);
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("NaN".to_string())), None);
        assert_eq!(non_empty(Some("Acme".to_string())), Some("Acme".to_string()));
    }

    #[test]
    fn test_rows_without_url_are_dropped() {
        assert!(row(None, Some("Acme")).into_listing().is_none());
        assert!(row(Some(""), Some("Acme")).into_listing().is_none());

        let listing = row(Some("https://x/1"), None).into_listing().unwrap();
        assert_eq!(listing.job_url, "https://x/1");
        assert_eq!(listing.company, None);
    }

    #[tokio::test]
    async fn test_fetch_dedupes_within_batch() {
        let rows = vec![
            row(Some("https://x/1"), Some("Acme")),
            row(Some("https://x/2"), Some("Globex")),
            row(Some("https://x/1"), Some("Acme")),
        ];
        let client = ScrapeClient::new(Arc::new(FixedProvider(rows)));

        let listings = client.fetch("Backend", 0, 5, None).await.unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].job_url, "https://x/1");
        assert_eq!(listings[1].job_url, "https://x/2");
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let client = ScrapeClient::with_timeout(
            Arc::new(SleepyProvider(Duration::from_millis(250))),
            Duration::from_millis(20),
        );

        let err = client.fetch("Backend", 0, 5, None).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_provider_errors_collapse_to_unavailable() {
        let client = ScrapeClient::new(Arc::new(BrokenProvider));

        let err = client.fetch("Backend", 0, 5, None).await.unwrap_err();
        assert!(err.to_string().contains("job scraper unavailable"));
    }
}
