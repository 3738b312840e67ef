// src/engine/sqlmap.rs
// =============================================================================
// This module talks to the sqlmap REST API (`sqlmapapi.py -s`, default port
// 8775). That API is the engine that actually runs the injection:
//
//   GET  {api}/task/new            -> { "success": true, "taskid": "..." }
//   POST {api}/scan/{id}/start     -> body: scan options (url, cookie, data)
//   GET  {api}/scan/{id}/log       -> { "success": true, "log": [...] }
//   GET  {api}/scan/{id}/data      -> { "success": true, "data": [...] }
//
// Error mapping follows the taxonomy in src/error.rs: transport failures
// mean the engine is unavailable, a well-formed refusal means the task
// could not be created, and anything going wrong while reading log/data is
// a per-task query failure the monitor can absorb.
// =============================================================================

use super::{Finding, LogEntry, ScanEngine, TaskHandle, TaskId};
use crate::crawl::CookieSet;
use crate::error::ScanError;
use crate::page::FormMap;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for a sqlmap REST API server.
pub struct SqlmapEngine {
    client: Client,
    api_url: String,
}

impl SqlmapEngine {
    /// Creates a client for the API server at `api_url`
    /// (e.g. "http://127.0.0.1:8775").
    pub fn new(api_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    // Asks the API for a fresh task id.
    async fn task_new(&self, target_url: &str) -> Result<TaskId, ScanError> {
        let endpoint = format!("{}/task/new", self.api_url);
        let response = self.client.get(&endpoint).send().await.map_err(|e| {
            ScanError::EngineUnavailable {
                reason: e.to_string(),
            }
        })?;

        let body: TaskNewResponse =
            response
                .json()
                .await
                .map_err(|e| ScanError::TaskCreationFailed {
                    url: target_url.to_string(),
                    reason: format!("malformed task/new response: {e}"),
                })?;

        match (body.success, body.taskid) {
            (true, Some(id)) if !id.is_empty() => Ok(id),
            _ => Err(ScanError::TaskCreationFailed {
                url: target_url.to_string(),
                reason: "engine did not assign a task id".to_string(),
            }),
        }
    }

    // Starts the scan for an already-created task.
    async fn scan_start(
        &self,
        task_id: &str,
        options: &ScanOptions,
    ) -> Result<(), ScanError> {
        let endpoint = format!("{}/scan/{}/start", self.api_url, task_id);
        let response = self
            .client
            .post(&endpoint)
            .json(options)
            .send()
            .await
            .map_err(|e| ScanError::EngineUnavailable {
                reason: e.to_string(),
            })?;

        let body: ScanStartResponse =
            response
                .json()
                .await
                .map_err(|e| ScanError::TaskCreationFailed {
                    url: options.url.clone(),
                    reason: format!("malformed scan/start response: {e}"),
                })?;

        if !body.success {
            return Err(ScanError::TaskCreationFailed {
                url: options.url.clone(),
                reason: body
                    .message
                    .unwrap_or_else(|| "engine refused to start the scan".to_string()),
            });
        }

        debug!(task_id, url = %options.url, "sqlmap scan started");
        Ok(())
    }

    // Shared body of scan_log/scan_data: GET an endpoint, decode as T.
    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        task: &TaskHandle,
        what: &str,
    ) -> Result<T, ScanError> {
        let endpoint = format!("{}/scan/{}/{}", self.api_url, task.id, what);
        let response =
            self.client
                .get(&endpoint)
                .send()
                .await
                .map_err(|e| ScanError::TaskQueryFailed {
                    task_id: task.id.clone(),
                    reason: e.to_string(),
                })?;

        response.json().await.map_err(|e| ScanError::TaskQueryFailed {
            task_id: task.id.clone(),
            reason: format!("malformed scan/{what} response: {e}"),
        })
    }
}

#[async_trait]
impl ScanEngine for SqlmapEngine {
    async fn create_url_task(&self, url: &str) -> Result<TaskHandle, ScanError> {
        let id = self.task_new(url).await?;
        let options = ScanOptions {
            url: url.to_string(),
            cookie: None,
            data: None,
        };
        self.scan_start(&id, &options).await?;
        Ok(TaskHandle {
            id,
            target_url: url.to_string(),
        })
    }

    async fn create_form_task(
        &self,
        url: &str,
        forms: &FormMap,
        cookies: &CookieSet,
    ) -> Result<TaskHandle, ScanError> {
        let id = self.task_new(url).await?;
        let options = ScanOptions {
            url: url.to_string(),
            cookie: cookie_header(cookies),
            data: form_body(forms, url),
        };
        self.scan_start(&id, &options).await?;
        Ok(TaskHandle {
            id,
            target_url: url.to_string(),
        })
    }

    async fn scan_log(&self, task: &TaskHandle) -> Result<Vec<LogEntry>, ScanError> {
        let body: ScanLogResponse = self.query(task, "log").await?;
        if !body.success {
            return Err(ScanError::TaskQueryFailed {
                task_id: task.id.clone(),
                reason: "engine reported log query failure".to_string(),
            });
        }
        Ok(body.log)
    }

    async fn scan_data(&self, task: &TaskHandle) -> Result<Vec<Finding>, ScanError> {
        let body: ScanDataResponse = self.query(task, "data").await?;
        if !body.success {
            return Err(ScanError::TaskQueryFailed {
                task_id: task.id.clone(),
                reason: "engine reported data query failure".to_string(),
            });
        }
        Ok(body.data)
    }
}

// --- wire types ---------------------------------------------------------

/// Options posted to scan/{id}/start. Fields sqlmap does not need for this
/// scan are omitted entirely rather than sent as null.
#[derive(Debug, Serialize)]
struct ScanOptions {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cookie: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskNewResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    taskid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScanStartResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScanLogResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    log: Vec<LogEntry>,
}

#[derive(Debug, Deserialize)]
struct ScanDataResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<Finding>,
}

// Builds a "name=value; name2=value2" Cookie header from the session set.
// Sorted by name so the same set always produces the same header.
fn cookie_header(cookies: &CookieSet) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    let mut pairs: Vec<_> = cookies.iter().collect();
    pairs.sort_by_key(|(name, _)| name.as_str());
    Some(
        pairs
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

// Builds an urlencoded request body from the first form discovered on the
// page being scanned. The rest of the form map is cross-page context; for
// the POST body only this page's own form is relevant.
fn form_body(forms: &FormMap, url: &str) -> Option<String> {
    let form = forms.get(url)?.first()?;
    if form.fields.is_empty() {
        return None;
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for field in &form.fields {
        serializer.append_pair(&field.name, field.value.as_deref().unwrap_or(""));
    }
    Some(serializer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::extract_forms;

    #[test]
    fn test_task_new_response_shape() {
        let body: TaskNewResponse =
            serde_json::from_str(r#"{"success": true, "taskid": "fa0e9f7a8c3e2b41"}"#)
                .unwrap();
        assert!(body.success);
        assert_eq!(body.taskid.as_deref(), Some("fa0e9f7a8c3e2b41"));
    }

    #[test]
    fn test_scan_log_response_shape() {
        let raw = r#"{
            "success": true,
            "log": [
                {"time": "12:00:01", "level": "INFO", "message": "testing connection"},
                {"time": "12:00:02", "level": "WARNING", "message": "heuristic test"}
            ]
        }"#;
        let body: ScanLogResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.log.len(), 2);
        assert_eq!(body.log[1].level, "WARNING");
    }

    #[test]
    fn test_scan_data_response_defaults_to_empty() {
        let body: ScanDataResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(body.success);
        assert!(body.data.is_empty());
    }

    #[test]
    fn test_cookie_header_is_sorted_and_joined() {
        let mut cookies = CookieSet::new();
        cookies.insert("z".to_string(), "26".to_string());
        cookies.insert("a".to_string(), "1".to_string());
        assert_eq!(cookie_header(&cookies), Some("a=1; z=26".to_string()));
        assert_eq!(cookie_header(&CookieSet::new()), None);
    }

    #[test]
    fn test_form_body_encodes_this_pages_form() {
        let page_url = "https://example.com/login";
        let html = r#"
            <form action="/login" method="post">
                <input type="text" name="user" value="admin">
                <input type="password" name="pass">
            </form>
        "#;
        let mut forms = FormMap::new();
        forms.insert(page_url.to_string(), extract_forms(html, page_url));

        let body = form_body(&forms, page_url);
        assert_eq!(body.as_deref(), Some("user=admin&pass="));

        // A page with no recorded form produces no body
        assert_eq!(form_body(&forms, "https://example.com/other"), None);
    }
}
