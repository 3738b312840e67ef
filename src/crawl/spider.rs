// src/crawl/spider.rs
// =============================================================================
// This module implements the crawl half of the scanner: visit a starting
// URL, follow same-domain links depth-first, and hand every visited page to
// the task dispatcher as a potential injection point.
//
// How it works:
// 1. Parse and validate the start URL; its origin becomes the crawl scope
// 2. Visit a page: fetch it, record its forms, dispatch a scan task,
//    extract its links
// 3. Walk the links depth-first with an explicit frame stack (no call-stack
//    recursion, so a large site cannot blow the stack)
// 4. A child visit inherits the parent's session cookies; whichever side
//    ends up with the richer set wins, in both directions
//
// Pruning rules, checked before any fetch:
// - off-origin links (domain scoping)
// - already-visited URLs (the visited-forms map doubles as the guard)
// - links deeper than max_depth, when one is set
//
// A page that fails to fetch is treated as empty and the crawl moves on;
// a task that fails to dispatch aborts the crawl, because an injection
// point we cannot track is not "best effort", it is lost work.
// =============================================================================

use super::{richer, CookieSet};
use crate::engine::{ScanEngine, TaskCollection};
use crate::error::ScanError;
use crate::inject::TaskDispatcher;
use crate::page::{extract_forms, extract_links, FormMap, PageFetcher, PageVisit};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::{Origin, Url};

/// What one crawl produced: the scan tasks started, and the map of every
/// visited page to the forms found there.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub tasks: TaskCollection,
    pub visited_forms: FormMap,
}

// One level of the depth-first walk: the links still to follow from a
// visited page, plus the effective cookie set at that page.
struct Frame {
    links: Vec<String>,
    next: usize,
    depth: usize,
    cookies: CookieSet,
}

/// Depth-limited, same-origin crawler that dispatches one scan task per
/// visited page.
pub struct Crawler<'a> {
    fetcher: &'a dyn PageFetcher,
    dispatcher: TaskDispatcher<'a>,
    cancel: CancellationToken,
}

impl<'a> Crawler<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        engine: &'a dyn ScanEngine,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            dispatcher: TaskDispatcher::new(engine),
            cancel,
        }
    }

    /// Crawls from `start_url`, dispatching a scan task for every admitted
    /// page. `max_depth: None` means unlimited depth (bounded only by the
    /// origin scope and the visited map).
    ///
    /// Fails fast on a malformed start URL, before any task is created.
    pub async fn crawl(
        &self,
        start_url: &str,
        max_depth: Option<usize>,
    ) -> Result<CrawlOutcome, ScanError> {
        let root = parse_target(start_url)?;
        let origin = root.origin();

        info!(start_url = %root, ?max_depth, "crawl started");

        let mut visited_forms = FormMap::new();
        let mut tasks = TaskCollection::new();

        // The root is always admitted: it defines the origin, is not yet
        // visited, and sits at depth 0
        let root_frame = self
            .visit(root.as_str(), 0, CookieSet::new(), &mut visited_forms, &mut tasks)
            .await?;
        let mut stack = vec![root_frame];

        loop {
            if self.cancel.is_cancelled() {
                info!("crawl cancelled, returning tasks collected so far");
                break;
            }

            // Take the next unexplored link from the top frame, if any
            let next_link = match stack.last_mut() {
                None => break,
                Some(frame) => {
                    let link = frame.links.get(frame.next).cloned();
                    if link.is_some() {
                        frame.next += 1;
                    }
                    link.map(|url| (url, frame.depth + 1, frame.cookies.clone()))
                }
            };

            match next_link {
                Some((url, depth, inherited)) => {
                    if !admitted(&url, depth, max_depth, &origin, &visited_forms) {
                        continue;
                    }
                    let child = self
                        .visit(&url, depth, inherited, &mut visited_forms, &mut tasks)
                        .await?;
                    stack.push(child);
                }
                None => {
                    // Frame exhausted: propagate its cookies back up before
                    // the parent moves on to its next sibling link
                    if let Some(done) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            let current = std::mem::take(&mut parent.cookies);
                            parent.cookies = richer(current, done.cookies);
                        }
                    }
                }
            }
        }

        info!(
            pages = visited_forms.len(),
            tasks = tasks.len(),
            "website crawled"
        );

        Ok(CrawlOutcome {
            tasks,
            visited_forms,
        })
    }

    // Visits one admitted URL: fetch, record forms, dispatch, collect links.
    //
    // A fetch failure downgrades the page to an empty one (logged, not
    // fatal). A dispatch failure propagates and aborts the crawl.
    async fn visit(
        &self,
        url: &str,
        depth: usize,
        inherited: CookieSet,
        visited_forms: &mut FormMap,
        tasks: &mut TaskCollection,
    ) -> Result<Frame, ScanError> {
        debug!(url, depth, "visiting page");

        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url, error = %e, "fetch failed, treating page as empty");
                PageVisit::empty()
            }
        };

        // Recording the entry (even an empty one) is what marks the URL as
        // visited for the rest of the crawl
        visited_forms.insert(url.to_string(), extract_forms(&page.html, url));

        // This page's session: the inherited cookies unless its own fetch
        // produced a richer set
        let cookies = richer(inherited, page.cookies);

        let task = self
            .dispatcher
            .dispatch_form(url, visited_forms, &cookies)
            .await?;
        info!(url, task_id = %task.id, "scan task started");

        let links = extract_links(&page.html, url);
        tasks.insert(task.id.clone(), task);

        Ok(Frame {
            links,
            next: 0,
            depth,
            cookies,
        })
    }
}

// Validates a crawl root: parseable, and a web URL.
fn parse_target(url: &str) -> Result<Url, ScanError> {
    let parsed = Url::parse(url).map_err(|e| ScanError::InvalidTarget {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ScanError::InvalidTarget {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

// Decides whether a discovered link gets visited. All three prunes happen
// before any network traffic for the link.
fn admitted(
    url: &str,
    depth: usize,
    max_depth: Option<usize>,
    origin: &Origin,
    visited_forms: &FormMap,
) -> bool {
    if visited_forms.contains_key(url) {
        debug!(url, "pruned: already visited");
        return false;
    }

    let Ok(parsed) = Url::parse(url) else {
        debug!(url, "pruned: unparseable link");
        return false;
    };
    if parsed.origin() != *origin {
        debug!(url, "pruned: outside crawl origin");
        return false;
    }

    if let Some(limit) = max_depth {
        if depth > limit {
            debug!(url, depth, limit, "pruned: past depth limit");
            return false;
        }
    }

    true
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why an explicit stack instead of recursion?
//    - An async fn calling itself needs boxing anyway (recursive futures
//      have infinite size otherwise)
//    - Call-stack depth would scale with the deepest link chain on the
//      site; the frame stack lives on the heap
//    - The walk order is identical to the recursive version: depth-first,
//      children before the next sibling
//
// 2. Why does the cookie hand-off happen at pop time?
//    - A parent's set may only absorb a child's set once the child's whole
//      subtree is done, so the next sibling inherits the final result
// -----------------------------------------------------------------------------
