use scraper::{Html, Selector};
use serde_json::Value;

/// Extracts the first `headline` found in the JSON-LD blocks of the document.
///
/// Handles a single object, a top-level array and objects nested under `@graph`.
pub fn extract_headline(document: &Html) -> Option<String> {
    extract_field(document, "headline")
}

/// Extracts the first `description` found in the JSON-LD blocks of the document.
pub fn extract_description(document: &Html) -> Option<String> {
    extract_field(document, "description")
}

fn extract_field(document: &Html, field: &str) -> Option<String> {
    let script_selector = Selector::parse("script[type='application/ld+json']").ok()?;
    document
        .select(&script_selector)
        .filter_map(|script| serde_json::from_str::<Value>(script.text().collect::<String>().trim()).ok())
        .find_map(|json| find_in(&json, field))
}

fn find_in(json: &Value, field: &str) -> Option<String> {
    match json {
        Value::Array(items) => items.iter().find_map(|item| find_in(item, field)),
        Value::Object(obj) => obj
            .get(field)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| obj.get("@graph").and_then(|graph| find_in(graph, field))),
        _ => None,
    }
}
