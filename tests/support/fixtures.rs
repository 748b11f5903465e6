//! Product payloads and client builders shared by integration tests.

use std::time::Duration;

use harvester_core::fetch::{BackoffSchedule, RetryPolicy, Session};
use url::Url;

/// Minimal but complete product payload for `id`.
#[must_use]
pub fn product_json(id: &str, name: &str) -> String {
    format!(
        r#"{{
  "id": "{id}",
  "name": "{name}",
  "product_listing_assets": [{{"image_url": "https://img.example.com/{id}.jpg"}}],
  "attribute_list": {{
    "color": "black",
    "category": "Shoes",
    "functions": ["cushioned"],
    "productfit": ["regular fit"],
    "base_material": ["mesh"],
    "is_orderable": true
  }},
  "pricing_information": {{"currentPrice": 12100.4}},
  "product_description": {{"text": "Everyday runner.", "usps": ["mesh", "light"]}},
  "variation_list": [{{"size": "26.0"}}, {{"size": "27.0"}}],
  "product_link_list": [{{"search_color": "black"}}, {{"search_color": "white"}}]
}}"#
    )
}

/// Session pointed at a mock server with a short timeout.
#[must_use]
pub fn session_for(uri: &str) -> Session {
    let base = Url::parse(uri).expect("mock server uri is a valid URL");
    Session::with_base_url(base, Duration::from_secs(5)).expect("client builds")
}

/// Retry policy without real sleeps.
#[must_use]
pub fn instant_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, BackoffSchedule::immediate())
}

/// Files in `dir` whose names end with `.html`, sorted.
#[must_use]
pub fn html_artifacts(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .filter(|name| name.ends_with(".html"))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
