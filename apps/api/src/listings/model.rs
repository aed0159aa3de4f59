use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One internship listing as scraped from an external job board.
///
/// Immutable once built. Identity is the full field tuple: two listings with
/// the same `job_url` but different descriptions are distinct values, which
/// is what the dedup below keys on. Serialized form (stable field order) is
/// also the cache member format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Listing {
    pub company: Option<String>,
    pub job_url: String,
    pub title: Option<String>,
    pub date_posted: Option<DateTime<Utc>>,
    pub is_remote: Option<bool>,
    pub company_industry: Option<String>,
    pub description: Option<String>,
}

impl Listing {
    /// Canonical string form used as the ranked-set member.
    pub fn cache_member(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_cache_member(raw: &str) -> serde_json::Result<Listing> {
        serde_json::from_str(raw)
    }
}

/// Removes duplicate listings, keeping the first occurrence of each value.
/// Idempotent: `dedupe(dedupe(l)) == dedupe(l)`.
pub fn dedupe(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| seen.insert(listing.clone()))
        .collect()
}
