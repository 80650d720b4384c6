//! One-shot listing page fetcher.
//!
//! Retrieves the raw markup for a single URL. There is no crawling, no
//! pagination, and no retry: a failed fetch is fatal to the run.

use std::net::IpAddr;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};
use url::Url;

use reeltab_shared::{PageSnapshot, ReeltabError, Result};

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("reeltab/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// FetchedListing
// ---------------------------------------------------------------------------

/// A listing page with its snapshot metadata and raw markup.
#[derive(Debug, Clone)]
pub struct FetchedListing {
    /// Snapshot metadata (source, hash, timestamps).
    pub snapshot: PageSnapshot,
    /// The raw markup.
    pub html: String,
}

impl FetchedListing {
    /// Build a listing from pre-fetched markup without touching the network.
    ///
    /// `source` is recorded in the snapshot for traceability (typically the
    /// path the markup was read from).
    pub fn from_markup(html: impl Into<String>, source: &str) -> Self {
        let html = html.into();
        let snapshot = PageSnapshot {
            source: source.to_string(),
            content_hash: compute_hash(&html),
            fetched_at: Utc::now(),
            status_code: None,
            content_len: html.len(),
        };
        Self { snapshot, html }
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// HTTP client options for the single page fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// One-shot page fetcher wrapping a configured [`reqwest::Client`].
pub struct Fetcher {
    client: Client,
    /// Allow localhost/private IPs (for tests against mock servers).
    allow_localhost: bool,
}

impl Fetcher {
    /// Create a new fetcher with the given options.
    pub fn new(opts: &FetchOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| ReeltabError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            allow_localhost: false,
        })
    }

    /// Allow fetching from localhost/private IPs (for tests).
    #[cfg(test)]
    pub fn allow_localhost(mut self) -> Self {
        self.allow_localhost = true;
        self
    }

    /// Fetch the listing page at `url`.
    ///
    /// Non-2xx responses and unreachable hosts are fatal [`Network`] errors.
    ///
    /// [`Network`]: ReeltabError::Network
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<FetchedListing> {
        if !self.allow_localhost && is_ssrf_target(url) {
            warn!(%url, "refusing private/loopback target");
            return Err(ReeltabError::Network(format!(
                "{url}: refusing private/loopback target"
            )));
        }

        debug!("fetching listing page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ReeltabError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReeltabError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ReeltabError::Network(format!("{url}: body read failed: {e}")))?;

        let snapshot = PageSnapshot {
            source: url.to_string(),
            content_hash: compute_hash(&body),
            fetched_at: Utc::now(),
            status_code: Some(status.as_u16()),
            content_len: body.len(),
        };

        debug!(
            status = status.as_u16(),
            content_len = snapshot.content_len,
            "listing fetched"
        );

        Ok(FetchedListing {
            snapshot,
            html: body,
        })
    }
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Check if a URL targets a potentially dangerous resource.
fn is_ssrf_target(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    if let Some(host) = url.host_str() {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return is_private_ip(&ip);
        }
        if host == "localhost"
            || host.ends_with(".local")
            || host.ends_with(".internal")
        {
            return true;
        }
    }

    false
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

/// Compute SHA-256 hash of content.
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_markup_records_hash_and_length() {
        let listing = FetchedListing::from_markup("<html></html>", "fixtures/listing.html");
        assert_eq!(listing.snapshot.content_len, 13);
        assert_eq!(listing.snapshot.content_hash.len(), 64);
        assert_eq!(listing.snapshot.status_code, None);
        assert_eq!(listing.snapshot.source, "fixtures/listing.html");
    }

    #[test]
    fn ssrf_blocks_file_scheme() {
        let url = Url::parse("file:///etc/passwd").unwrap();
        assert!(is_ssrf_target(&url));
    }

    #[test]
    fn ssrf_blocks_private_and_loopback() {
        for u in [
            "http://192.168.1.1/listing",
            "http://10.0.0.1/",
            "http://127.0.0.1:8080/",
            "http://localhost:3000/page",
        ] {
            assert!(is_ssrf_target(&Url::parse(u).unwrap()), "{u}");
        }
    }

    #[test]
    fn ssrf_allows_public_hosts() {
        let url = Url::parse("https://www.imdb.com/search/title").unwrap();
        assert!(!is_ssrf_target(&url));
    }

    #[tokio::test]
    async fn fetch_returns_body_and_snapshot() {
        let server = wiremock::MockServer::start().await;
        let body = "<html><body><h3 class=\"lister-item-header\">x</h3></body></html>";

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/listing"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&FetchOptions::default())
            .unwrap()
            .allow_localhost();
        let url = Url::parse(&format!("{}/listing", server.uri())).unwrap();
        let listing = fetcher.fetch(&url).await.unwrap();

        assert_eq!(listing.html, body);
        assert_eq!(listing.snapshot.status_code, Some(200));
        assert_eq!(listing.snapshot.content_len, body.len());
        assert_eq!(listing.snapshot.content_hash, {
            let mut h = Sha256::new();
            h.update(body.as_bytes());
            format!("{:x}", h.finalize())
        });
    }

    #[tokio::test]
    async fn fetch_non_success_is_fatal() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/gone"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&FetchOptions::default())
            .unwrap()
            .allow_localhost();
        let url = Url::parse(&format!("{}/gone", server.uri())).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, ReeltabError::Network(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn fetch_refuses_loopback_without_escape_hatch() {
        let fetcher = Fetcher::new(&FetchOptions::default()).unwrap();
        let url = Url::parse("http://127.0.0.1:9/listing").unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(err.to_string().contains("refusing"));
    }
}
