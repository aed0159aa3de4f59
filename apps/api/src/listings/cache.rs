//! Ranked Cache Store — redis sorted sets keyed by Preference Key.
//!
//! Members are canonical-JSON Listings scored by insertion order; a sibling
//! `<key>_count` counter hands out the next score so separate population
//! bursts append without colliding. The cache is a pure optimization: every
//! failure path degrades to "nothing cached" and is only visible in logs.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::warn;

use crate::listings::model::{dedupe, Listing};

/// Entries live 24 hours from first write. TTL is applied with NX semantics,
/// so later population bursts never extend the window.
const CACHE_TTL_SECS: i64 = 24 * 60 * 60;

/// Builds the cache partition key from a role preference and an optional
/// industry filter. Industry is lowercased here so the read and write paths
/// can never fragment across differently-cased keys.
pub fn preference_key(preference: &str, industry: Option<&str>) -> String {
    match industry {
        Some(industry) => format!("{}_{}", preference, industry.to_lowercase()),
        None => preference.to_string(),
    }
}

fn counter_key(key: &str) -> String {
    format!("{key}_count")
}

#[async_trait]
pub trait ListingCache: Send + Sync {
    /// Returns up to `end - start` cached listings in insertion-rank order,
    /// deduplicated first-seen. Backing-store failures degrade to an empty
    /// result; the cache is never a hard dependency.
    async fn read_range(&self, key: &str, start: usize, end: usize) -> Vec<Listing>;

    /// Appends listings with monotonically increasing scores. Best-effort:
    /// failures are logged and swallowed, since population commonly runs
    /// after the response has been sent.
    async fn append(&self, key: &str, listings: &[Listing]);
}

pub struct RedisListingCache {
    client: redis::Client,
}

impl RedisListingCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn try_read(
        &self,
        key: &str,
        start: usize,
        end: usize,
    ) -> Result<Vec<Listing>, redis::RedisError> {
        if end <= start {
            return Ok(Vec::new());
        }
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let members: Vec<String> = con.zrange(key, start as isize, end as isize - 1).await?;

        let mut listings = Vec::with_capacity(members.len());
        for member in members {
            match Listing::from_cache_member(&member) {
                Ok(listing) => listings.push(listing),
                Err(e) => warn!("dropping malformed cache member under '{key}': {e}"),
            }
        }
        Ok(dedupe(listings))
    }

    async fn try_append(&self, key: &str, listings: &[Listing]) -> anyhow::Result<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;

        let counter = counter_key(key);
        let next: Option<i64> = con.get(&counter).await?;
        let mut score = next.unwrap_or(0);

        // One atomic batch: members, counter bump, TTL-if-unset on both.
        let mut pipe = redis::pipe();
        pipe.atomic();
        for listing in listings {
            pipe.zadd(key, listing.cache_member()?, score).ignore();
            score += 1;
        }
        pipe.set(&counter, score).ignore();
        pipe.cmd("EXPIRE").arg(key).arg(CACHE_TTL_SECS).arg("NX").ignore();
        pipe.cmd("EXPIRE")
            .arg(&counter)
            .arg(CACHE_TTL_SECS)
            .arg("NX")
            .ignore();
        pipe.query_async::<_, ()>(&mut con).await?;
        Ok(())
    }
}

#[async_trait]
impl ListingCache for RedisListingCache {
    async fn read_range(&self, key: &str, start: usize, end: usize) -> Vec<Listing> {
        match self.try_read(key, start, end).await {
            Ok(listings) => listings,
            Err(e) => {
                warn!("cache read for '{key}' failed, treating as miss: {e}");
                Vec::new()
            }
        }
    }

    async fn append(&self, key: &str, listings: &[Listing]) {
        if listings.is_empty() {
            return;
        }
        if let Err(e) = self.try_append(key, listings).await {
            warn!("cache population for '{key}' failed: {e:#}");
        }
    }
}
