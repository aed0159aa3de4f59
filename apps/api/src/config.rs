use anyhow::{ensure, Context, Result};

/// Application configuration loaded from environment variables once at
/// startup and passed by reference to everything that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    /// Base URL of the job-board scraping sidecar.
    pub scraper_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Listings per page, and the rank width of one cache window.
    pub cache_page_size: usize,
    /// Number of job boards the scraper queries per call; scales the
    /// per-call result window down so one call still fills a page.
    pub job_portal_count: usize,
    /// Page size for the dashboard preview endpoint.
    pub preview_page_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            scraper_url: require_env("SCRAPER_URL")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            cache_page_size: env_or("CACHE_PAGE_SIZE", "10")
                .parse::<usize>()
                .context("CACHE_PAGE_SIZE must be a positive integer")?,
            job_portal_count: env_or("JOB_PORTAL_COUNT", "2")
                .parse::<usize>()
                .context("JOB_PORTAL_COUNT must be a positive integer")?,
            preview_page_size: env_or("PREVIEW_PAGE_SIZE", "5")
                .parse::<usize>()
                .context("PREVIEW_PAGE_SIZE must be a positive integer")?,
        };

        ensure!(config.job_portal_count >= 1, "JOB_PORTAL_COUNT must be >= 1");
        ensure!(
            config.cache_page_size >= config.job_portal_count,
            "CACHE_PAGE_SIZE must be at least JOB_PORTAL_COUNT"
        );
        Ok(config)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
