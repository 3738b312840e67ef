// src/inject/dispatch.rs
// =============================================================================
// This module is the single point of scan task creation. Both modes go
// through it:
// - dispatch_url: direct injection against one URL, no crawling
// - dispatch_form: crawl mode, with the accumulated form map and session
//   cookies as context
//
// Engine failures are never swallowed here. A task that cannot be created
// is an injection point nobody will ever monitor, so the caller has to
// know.
// =============================================================================

use crate::crawl::CookieSet;
use crate::engine::{ScanEngine, TaskHandle};
use crate::error::ScanError;
use crate::page::FormMap;
use tracing::debug;
use url::Url;

/// Creates scan tasks on the external engine.
pub struct TaskDispatcher<'a> {
    engine: &'a dyn ScanEngine,
}

impl<'a> TaskDispatcher<'a> {
    pub fn new(engine: &'a dyn ScanEngine) -> Self {
        Self { engine }
    }

    /// Direct-injection mode: scan `url` as-is, no form context.
    ///
    /// Validates the URL first, so a typo fails before the engine is
    /// even contacted.
    pub async fn dispatch_url(&self, url: &str) -> Result<TaskHandle, ScanError> {
        validate_target(url)?;
        debug!(url, "dispatching direct injection task");
        self.engine.create_url_task(url).await
    }

    /// Crawl mode: scan `url` with everything discovered so far.
    ///
    /// The form map covers all visited pages, not just this one - the
    /// engine may use cross-page context. URLs reaching this point came
    /// from the crawler, which already validated them.
    pub async fn dispatch_form(
        &self,
        url: &str,
        forms: &FormMap,
        cookies: &CookieSet,
    ) -> Result<TaskHandle, ScanError> {
        debug!(url, forms = forms.len(), cookies = cookies.len(), "dispatching form task");
        self.engine.create_form_task(url, forms, cookies).await
    }
}

fn validate_target(url: &str) -> Result<(), ScanError> {
    let parsed = Url::parse(url).map_err(|e| ScanError::InvalidTarget {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ScanError::InvalidTarget {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
