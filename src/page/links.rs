// src/page/links.rs
// =============================================================================
// This module extracts outbound links from HTML pages.
//
// The contract with the crawler: return every http(s) link on the page as
// an absolute URL. Off-domain and already-visited links are included -
// filtering them is the crawler's job, because the domain scope and the
// visited map live there.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

/// Extracts all http(s) links from HTML content as absolute URLs.
///
/// Parameters:
///   html: the HTML content to parse
///   page_url: the URL of the page (for resolving relative links)
pub fn extract_links(html: &str, page_url: &str) -> Vec<String> {
    let mut links = Vec::new();

    let document = Html::parse_document(html);

    // Our selector is a constant and known to be valid, so unwrap is OK
    let selector = Selector::parse("a[href]").unwrap();

    let Ok(base) = Url::parse(page_url) else {
        tracing::warn!(page_url, "cannot extract links: invalid page URL");
        return links;
    };

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_link(&base, href) {
                links.push(absolute_url);
            }
        }
    }

    links
}

// Resolves a link (possibly relative) to an absolute http(s) URL.
// Anchors and non-web schemes are not crawlable, so they resolve to None.
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    if href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_hrefs_resolve_against_the_page() {
        let base = Url::parse("https://shop.example/catalog/item").unwrap();
        assert_eq!(
            resolve_link(&base, "reviews"),
            Some("https://shop.example/catalog/reviews".to_string())
        );
        assert_eq!(
            resolve_link(&base, "/cart"),
            Some("https://shop.example/cart".to_string())
        );
    }

    #[test]
    fn test_absolute_hrefs_pass_through() {
        // Off-domain is fine here; scoping is the crawler's decision
        let base = Url::parse("https://shop.example/catalog/item").unwrap();
        assert_eq!(
            resolve_link(&base, "https://cdn.example/banner"),
            Some("https://cdn.example/banner".to_string())
        );
    }

    #[test]
    fn test_non_navigable_hrefs_are_dropped() {
        let base = Url::parse("https://shop.example/").unwrap();
        for href in [
            "#top",
            "mailto:sales@shop.example",
            "tel:+15550100",
            "javascript:history.back()",
        ] {
            assert_eq!(resolve_link(&base, href), None, "{href} is not crawlable");
        }
    }

    #[test]
    fn test_non_web_schemes_resolve_to_none() {
        // These parse as valid URLs but cannot be fetched by the crawler
        let base = Url::parse("https://shop.example/").unwrap();
        assert_eq!(resolve_link(&base, "ftp://files.shop.example/dump.sql"), None);
        assert_eq!(resolve_link(&base, "data:text/html,hello"), None);
    }

    #[test]
    fn test_extract_keeps_offsite_links() {
        // Domain filtering happens in the crawler, not here
        let html = r#"
            <a href="/a">internal</a>
            <a href="https://other.com/">external</a>
            <a href="ftp://example.com/file">not web</a>
        "#;
        let links = extract_links(html, "https://example.com/");
        assert_eq!(
            links,
            vec![
                "https://example.com/a".to_string(),
                "https://other.com/".to_string(),
            ]
        );
    }
}
