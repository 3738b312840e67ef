// src/page/fetch.rs
// =============================================================================
// This module fetches web pages and captures the cookies the server hands
// out for that fetch.
//
// Design points:
// - PageFetcher is a trait so the crawler can be tested against canned
//   pages instead of a live site
// - HTTP-level failures (404, 500, ...) are NOT errors here: an error page
//   still has HTML, and that HTML may still contain forms and links. Only
//   transport failures (timeout, DNS, refused connection) become
//   ScanError::FetchFailed, and the crawler absorbs those per branch.
// =============================================================================

use crate::crawl::CookieSet;
use crate::error::ScanError;
use async_trait::async_trait;
use reqwest::header::SET_COOKIE;
use reqwest::Client;
use std::time::Duration;

/// Everything one page fetch produces: the raw HTML plus the cookies the
/// server set on the response.
#[derive(Debug, Clone, Default)]
pub struct PageVisit {
    pub html: String,
    pub cookies: CookieSet,
}

impl PageVisit {
    /// The "nothing there" result the crawler substitutes for a failed
    /// branch: no forms, no links, no cookies.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Fetches a URL and returns its HTML plus observed cookies.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageVisit, ScanError>;
}

/// The production fetcher, backed by a pooled reqwest client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        // 10 second timeout per request; pages slower than that are treated
        // as a failed branch rather than stalling the whole crawl
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<PageVisit, ScanError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            ScanError::FetchFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        // Capture cookies before consuming the response body
        let cookies = cookies_from_headers(&response);

        let html = response.text().await.map_err(|e| ScanError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(PageVisit { html, cookies })
    }
}

// Collects the name=value pairs from every Set-Cookie header on a response.
// Attributes after the first ';' (Path, HttpOnly, ...) are irrelevant for
// the richness heuristic and for replaying the session, so we drop them.
fn cookies_from_headers(response: &reqwest::Response) -> CookieSet {
    let mut cookies = CookieSet::new();

    for value in response.headers().get_all(SET_COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        if let Some((name, value)) = parse_set_cookie(raw) {
            cookies.insert(name, value);
        }
    }

    cookies
}

// Parses "name=value; Path=/; HttpOnly" into ("name", "value").
fn parse_set_cookie(raw: &str) -> Option<(String, String)> {
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_visit_has_nothing() {
        let visit = PageVisit::empty();
        assert!(visit.html.is_empty());
        assert!(visit.cookies.is_empty());
    }

    #[test]
    fn test_parse_set_cookie_strips_attributes() {
        let parsed = parse_set_cookie("session=abc123; Path=/; HttpOnly");
        assert_eq!(parsed, Some(("session".to_string(), "abc123".to_string())));
    }

    #[test]
    fn test_parse_set_cookie_rejects_garbage() {
        assert_eq!(parse_set_cookie("no-equals-sign"), None);
        assert_eq!(parse_set_cookie("=valuewithoutname"), None);
    }
}
