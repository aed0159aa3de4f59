//! Internship listings: the ranked cache, the job-board scrape client, and
//! the orchestrator that merges the two into one paginated response.

pub mod cache;
pub mod handlers;
pub mod model;
pub mod orchestrator;
pub mod preferences;
pub mod scraper;
