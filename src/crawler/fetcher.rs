//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with timeout and user agent
//! - GET requests that follow redirects to the final URL
//! - Error classification
//! - A fixed retry count with no backoff

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::state::CrawlTask;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Why a fetch failed
///
/// All kinds are network-level failures from the crawl's point of view:
/// the task is abandoned and the crawl continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The per-request timeout elapsed
    Timeout,
    /// Connection refused, DNS failure, TLS error
    Connect,
    /// Server answered with a non-success status
    HttpStatus(u16),
    /// The response body could not be read
    Body,
    /// Anything else reqwest reports (redirect limit, bad URL, ...)
    Other,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connect => write!(f, "connect"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Body => write!(f, "body"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Page body
        html: String,
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
    },

    /// The request failed
    Failure {
        kind: FetchErrorKind,
        message: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    fn failure(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use price_sweep::config::{CrawlerConfig, UserAgentConfig};
/// use price_sweep::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default(), &UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_millis(crawler.timeout_ms);

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | Success with the body and the final URL |
/// | Non-2xx status | Failure(HttpStatus) |
/// | Timeout | Failure(Timeout) |
/// | Connection refused / DNS / TLS | Failure(Connect) |
/// | Body read error | Failure(Body) |
///
/// Never returns an error: every outcome is a `FetchResult`.
pub async fn fetch_page(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return FetchResult::failure(
            FetchErrorKind::HttpStatus(status.as_u16()),
            format!("HTTP {}", status),
        );
    }

    match response.text().await {
        Ok(html) => FetchResult::Success {
            html,
            final_url,
            status_code: status.as_u16(),
        },
        Err(e) if e.is_timeout() => FetchResult::failure(FetchErrorKind::Timeout, e.to_string()),
        Err(e) => FetchResult::failure(FetchErrorKind::Body, e.to_string()),
    }
}

/// Fetches a task's URL, retrying failures up to `retries` extra times
///
/// There is no backoff between attempts; the per-request timeout is the only
/// pacing. The task's attempt counter is incremented for every request made.
pub async fn fetch_with_retries(client: &Client, task: &mut CrawlTask, retries: u32) -> FetchResult {
    loop {
        task.attempts += 1;
        let result = fetch_page(client, &task.url).await;

        if result.is_success() || task.attempts > retries {
            return result;
        }

        if let FetchResult::Failure { kind, message } = &result {
            tracing::debug!(
                "Attempt {} for {} failed ({}: {}), retrying",
                task.attempts,
                task.url,
                kind,
                message
            );
        }
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::failure(FetchErrorKind::Timeout, "Request timeout")
    } else if e.is_connect() {
        FetchResult::failure(FetchErrorKind::Connect, format!("Connection failed: {}", e))
    } else if e.is_body() || e.is_decode() {
        FetchResult::failure(FetchErrorKind::Body, e.to_string())
    } else {
        FetchResult::failure(FetchErrorKind::Other, e.to_string())
    }
}
