// src/page/mod.rs
// =============================================================================
// This module contains the page collaborators: everything that turns a URL
// into crawlable material.
//
// Submodules:
// - fetch: the PageFetcher trait and its reqwest-backed default
// - forms: extracts HTML forms (the injection points) from a page
// - links: extracts outbound links for the crawler to follow
//
// The crawler only talks to the trait and the two extraction functions, so
// tests swap in mock fetchers without touching the network.
// =============================================================================

mod fetch;
mod forms;
mod links;

// Re-export public items from submodules
pub use fetch::{HttpFetcher, PageFetcher, PageVisit};
pub use forms::{extract_forms, FormMap};
pub use links::extract_links;
