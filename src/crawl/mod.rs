// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling for injection points.
//
// Features:
// - Depth-first crawling starting from a URL, via an explicit frame stack
// - Same-origin restriction (the crawl never leaves the target site)
// - Configurable depth limit (or unlimited)
// - Session cookie inheritance between visits ("richer set wins")
// - One scan task dispatched per visited page
//
// Submodules:
// - spider: the crawler itself
// - cookies: the cookie-richness propagation policy
// =============================================================================

mod cookies;
mod spider;

// Re-export the crawling API
pub use cookies::{richer, CookieSet};
pub use spider::{CrawlOutcome, Crawler};
