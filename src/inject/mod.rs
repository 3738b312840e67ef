// src/inject/mod.rs
// =============================================================================
// This module is the top-level entry point of the scanner core.
//
// One operation, two modes:
// - forms = false: inject directly against the given URL (one task)
// - forms = true:  crawl the site from the URL and inject every page
//
// And two ways the resulting tasks are handled:
// - no callback: block on the task monitor until cancelled
// - a callback:  hand the collection over and return the callback's result
//
// The outcome is a single tagged type instead of two unrelated return
// shapes, so callers always know which path was taken.
// =============================================================================

mod dispatch;

pub use dispatch::TaskDispatcher;

use crate::crawl::{CrawlOutcome, Crawler};
use crate::engine::{ScanEngine, TaskCollection};
use crate::error::ScanError;
use crate::monitor::{MonitorExit, TaskMonitor, TaskReporter};
use crate::page::PageFetcher;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Matches the reference sqlmap polling cadence.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// How one `inject` invocation ended.
#[derive(Debug)]
pub enum InjectOutcome<T> {
    /// The task collection was handed to the caller's callback; this is
    /// what the callback returned.
    Delegated(T),
    /// The blocking monitor ran and eventually exited.
    Monitored(MonitorExit),
}

/// Wires the collaborators together and runs one injection operation.
pub struct Injector<'a> {
    engine: &'a dyn ScanEngine,
    fetcher: &'a dyn PageFetcher,
    reporter: &'a dyn TaskReporter,
    cancel: CancellationToken,
    poll_interval: Duration,
}

impl<'a> Injector<'a> {
    pub fn new(
        engine: &'a dyn ScanEngine,
        fetcher: &'a dyn PageFetcher,
        reporter: &'a dyn TaskReporter,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            engine,
            fetcher,
            reporter,
            cancel,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Runs one injection operation.
    ///
    /// Parameters:
    ///   forms: crawl for forms (true) or inject `url` directly (false)
    ///   url: the target, or the crawl root
    ///   max_depth: crawl depth limit; None = unlimited; ignored when
    ///              forms is false
    ///   user_callback: takes ownership of the task collection instead of
    ///                  entering the blocking monitor
    pub async fn inject<T>(
        &self,
        forms: bool,
        url: &str,
        max_depth: Option<usize>,
        user_callback: Option<Box<dyn FnOnce(TaskCollection) -> T + Send>>,
    ) -> Result<InjectOutcome<T>, ScanError> {
        let tasks = if forms {
            let crawler = Crawler::new(self.fetcher, self.engine, self.cancel.clone());
            let CrawlOutcome {
                tasks,
                visited_forms,
            } = crawler.crawl(url, max_depth).await?;
            info!(
                forms = visited_forms.values().map(Vec::len).sum::<usize>(),
                "form discovery complete"
            );
            tasks
        } else {
            // Direct mode: exactly one task, no fetching, no extraction
            let dispatcher = TaskDispatcher::new(self.engine);
            let task = dispatcher.dispatch_url(url).await?;
            info!(url, task_id = %task.id, "scan task started");
            let mut tasks = TaskCollection::new();
            tasks.insert(task.id.clone(), task);
            tasks
        };

        match user_callback {
            Some(callback) => Ok(InjectOutcome::Delegated(callback(tasks))),
            None => {
                let monitor =
                    TaskMonitor::new(self.engine, self.poll_interval, self.cancel.clone());
                let exit = monitor.monitor(&tasks, self.reporter).await;
                Ok(InjectOutcome::Monitored(exit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::CookieSet;
    use crate::engine::{Finding, LogEntry, TaskHandle};
    use crate::error::ScanError;
    use crate::monitor::TaskSnapshot;
    use crate::page::{FormMap, PageVisit};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // A fetcher that counts calls; direct mode must never touch it.
    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<PageVisit, ScanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PageVisit {
                html: "<p>empty</p>".to_string(),
                cookies: CookieSet::new(),
            })
        }
    }

    #[derive(Default)]
    struct CountingEngine {
        next_id: AtomicUsize,
    }

    #[async_trait]
    impl ScanEngine for CountingEngine {
        async fn create_url_task(&self, url: &str) -> Result<TaskHandle, ScanError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            Ok(TaskHandle {
                id: format!("task-{id}"),
                target_url: url.to_string(),
            })
        }

        async fn create_form_task(
            &self,
            url: &str,
            _forms: &FormMap,
            _cookies: &CookieSet,
        ) -> Result<TaskHandle, ScanError> {
            self.create_url_task(url).await
        }

        async fn scan_log(&self, _task: &TaskHandle) -> Result<Vec<LogEntry>, ScanError> {
            Ok(Vec::new())
        }

        async fn scan_data(&self, _task: &TaskHandle) -> Result<Vec<Finding>, ScanError> {
            Ok(Vec::new())
        }
    }

    struct NullReporter;

    impl TaskReporter for NullReporter {
        fn on_task_changed(&self, _task: &TaskHandle, _snapshot: &TaskSnapshot) {}
    }

    #[tokio::test]
    async fn test_direct_mode_creates_one_task_without_fetching() {
        let engine = CountingEngine::default();
        let fetcher = CountingFetcher::default();
        let injector = Injector::new(&engine, &fetcher, &NullReporter, CancellationToken::new());

        let outcome = injector
            .inject(
                false,
                "https://t/x?id=1",
                None,
                Some(Box::new(|tasks: TaskCollection| tasks)),
            )
            .await
            .unwrap();

        let InjectOutcome::Delegated(tasks) = outcome else {
            panic!("callback path must return Delegated");
        };
        assert_eq!(tasks.len(), 1);
        assert_eq!(
            tasks.values().next().unwrap().target_url,
            "https://t/x?id=1"
        );
        // No crawling, no page fetches, no extraction in direct mode
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_direct_mode_rejects_malformed_url() {
        let engine = CountingEngine::default();
        let fetcher = CountingFetcher::default();
        let injector = Injector::new(&engine, &fetcher, &NullReporter, CancellationToken::new());

        let result = injector
            .inject(false, "definitely not a url", None, Some(Box::new(|_| ())))
            .await;

        assert!(matches!(result, Err(ScanError::InvalidTarget { .. })));
    }

    #[tokio::test]
    async fn test_forms_mode_delegates_crawl_results() {
        let engine = CountingEngine::default();
        let fetcher = CountingFetcher::default();
        let injector = Injector::new(&engine, &fetcher, &NullReporter, CancellationToken::new());

        let outcome = injector
            .inject(
                true,
                "https://example.com/",
                Some(0),
                Some(Box::new(|tasks: TaskCollection| tasks.len())),
            )
            .await
            .unwrap();

        // Depth 0: only the root page is visited and dispatched
        assert!(matches!(outcome, InjectOutcome::Delegated(1)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_callback_blocks_on_monitor_until_cancelled() {
        let engine = CountingEngine::default();
        let fetcher = CountingFetcher::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let injector = Injector::new(&engine, &fetcher, &NullReporter, cancel);

        let outcome = injector
            .inject::<()>(false, "https://t/x?id=1", None, None)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            InjectOutcome::Monitored(MonitorExit::Cancelled)
        ));
    }
}
