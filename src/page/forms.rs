// src/page/forms.rs
// =============================================================================
// This module extracts HTML forms from a page. Every form found here is a
// potential SQL injection point.
//
// We use the `scraper` crate:
// - Parses HTML into a DOM (built on html5ever)
// - Supports CSS selectors for finding <form> elements and their fields
//
// The extraction is intentionally permissive: a form with no named fields
// is still recorded, because the engine may probe its action URL anyway.
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

/// The visited-forms map: page URL -> forms discovered on that page.
///
/// A key being present means the page was visited, even when its Vec is
/// empty - the crawler uses this both as crawl result and as its
/// "already seen" guard.
pub type FormMap = HashMap<String, Vec<Form>>;

/// One discovered HTML form.
#[derive(Debug, Clone, Serialize)]
pub struct Form {
    /// Submission URL, resolved against the page it was found on.
    pub action: String,
    /// Lowercased HTTP method, defaulting to "get".
    pub method: String,
    /// The named fields the form would submit.
    pub fields: Vec<FormField>,
}

/// A single named field inside a form.
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: String,
    pub field_type: String,
    pub value: Option<String>,
}

/// Extracts all forms from HTML content.
///
/// Parameters:
///   html: the HTML content to parse
///   page_url: the URL of the page (for resolving relative form actions)
pub fn extract_forms(html: &str, page_url: &str) -> Vec<Form> {
    let mut forms = Vec::new();

    let document = Html::parse_document(html);

    // These selectors are constants and known to be valid, so unwrap is OK
    let form_selector = Selector::parse("form").unwrap();
    let field_selector =
        Selector::parse("input[name], textarea[name], select[name]").unwrap();

    // Without a parseable page URL we cannot resolve relative actions,
    // so there is nothing useful to report
    let Ok(base) = Url::parse(page_url) else {
        tracing::warn!(page_url, "cannot extract forms: invalid page URL");
        return forms;
    };

    for element in document.select(&form_selector) {
        let action_attr = element.value().attr("action").unwrap_or("");
        let action = if action_attr.is_empty() {
            // An empty or missing action submits back to the page itself
            base.to_string()
        } else {
            match base.join(action_attr) {
                Ok(resolved) => resolved.to_string(),
                Err(_) => continue,
            }
        };

        let method = element
            .value()
            .attr("method")
            .unwrap_or("get")
            .to_lowercase();

        let fields = element
            .select(&field_selector)
            .filter_map(extract_field)
            .collect();

        forms.push(Form {
            action,
            method,
            fields,
        });
    }

    forms
}

// Turns one input/textarea/select element into a FormField.
// Elements without a name never reach here (the selector requires [name]).
fn extract_field(element: ElementRef) -> Option<FormField> {
    let name = element.value().attr("name")?.to_string();

    let field_type = match element.value().name() {
        "textarea" => "textarea".to_string(),
        "select" => "select".to_string(),
        // For <input> the type attribute decides; browsers default to text
        _ => element
            .value()
            .attr("type")
            .unwrap_or("text")
            .to_lowercase(),
    };

    let value = element.value().attr("value").map(str::to_string);

    Some(FormField {
        name,
        field_type,
        value,
    })
}
