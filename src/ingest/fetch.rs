use std::collections::HashSet;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::page;
use crate::conf::Settings;
use crate::model::RawPosting;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("invalid base url {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },
}

impl FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http { .. } => true,
            FetchError::Status { status, .. } => retryable_status(*status),
            FetchError::BaseUrl { .. } => false,
        }
    }
}

fn retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Polite sequential HTTP client for the job board.
pub struct Fetcher {
    client: Client,
    base: Url,
    delay: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let base = Url::parse(&settings.base_url).map_err(|e| FetchError::BaseUrl {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9,fr-FR;q=0.8,fr;q=0.7"),
        );

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .map_err(|source| FetchError::Http {
                url: settings.base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base,
            delay: settings.request_delay(),
            max_retries: settings.max_retries,
            backoff: settings.backoff(),
        })
    }

    /// GET `url` as text, retrying 429/5xx and transport errors with
    /// exponential backoff.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let backoff = backoff_delay(self.backoff, attempt);
                    warn!(
                        "{} (attempt {}/{}), backing off {:.1}s",
                        e,
                        attempt + 1,
                        self.max_retries,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        let http = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.text().await.map_err(http)
    }

    /// Walk listing pages `1..=pages` and gather unique job URLs, stopping
    /// once `max_jobs` are known or a page comes back empty.
    pub async fn collect_job_urls(&self, location: &str, pages: u32, max_jobs: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for page_no in 1..=pages {
            if urls.len() >= max_jobs {
                break;
            }
            let listing = page::listing_url(self.base.as_str(), location, page_no);
            info!("Fetching listing page {}: {}", page_no, listing);

            let html = match self.get_text(&listing).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Skipping listing page {}: {}", page_no, e);
                    continue;
                }
            };

            let found = page::parse_listing(&html, &self.base);
            if found.is_empty() {
                info!("No jobs on page {}, stopping", page_no);
                break;
            }
            let before = urls.len();
            for url in found {
                if urls.len() >= max_jobs {
                    break;
                }
                if seen.insert(url.clone()) {
                    urls.push(url);
                }
            }
            debug!("Page {}: {} new job urls", page_no, urls.len() - before);

            if page_no < pages {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!("Collected {} job urls", urls.len());
        urls
    }

    /// Fetch and parse every detail page. Failed pages are logged and skipped.
    pub async fn fetch_postings(&self, urls: &[String]) -> Vec<RawPosting> {
        let pb = ProgressBar::new(urls.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
        {
            pb.set_style(style.progress_chars("=> "));
        }

        let mut postings = Vec::with_capacity(urls.len());
        let mut errors = 0usize;

        for (i, url) in urls.iter().enumerate() {
            match self.get_text(url).await {
                Ok(html) => postings.push(page::parse_job_page(url, &html)),
                Err(e) => {
                    errors += 1;
                    pb.suspend(|| warn!("Skipping {}: {}", url, e));
                }
            }
            pb.inc(1);
            if i + 1 < urls.len() {
                tokio::time::sleep(self.delay).await;
            }
        }

        pb.finish_and_clear();
        info!(
            "Fetched {} pages ({} ok, {} errors)",
            urls.len(),
            postings.len(),
            errors
        );
        postings
    }
}

/// `base * 2^attempt`, saturating at `Duration::MAX`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}
