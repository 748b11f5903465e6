//! Transport session: one cookie-carrying HTTP client for the whole run.
//!
//! Every request carries the same browser-like header set. The `User-Agent`
//! is drawn fresh from [`crate::user_agent::BROWSER_USER_AGENTS`] per request;
//! cookies set by the API persist in the shared jar across identifiers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{REFERER, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{DEFAULT_API_BASE, REQUEST_TIMEOUT_SECS};
use crate::user_agent::random_browser_user_agent;

/// Path appended to the API base to form the static `Referer`.
const REFERER_PATH: &str = "/s/men/";

/// Fixed headers sent with every request (besides `User-Agent` and `Referer`).
const COMMON_HEADERS: [(&str, &str); 12] = [
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "ja-JP,ja;q=0.9,en-US;q=0.8,en;q=0.7"),
    ("accept-encoding", "gzip, deflate, br"),
    ("connection", "keep-alive"),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-origin"),
    (
        "sec-ch-ua",
        r#""Google Chrome";v="129", "Not=A?Brand";v="8", "Chromium";v="129""#,
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""Windows""#),
    ("cache-control", "no-cache"),
    ("pragma", "no-cache"),
];

/// Long-lived HTTP session for the product API.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    cookies: Arc<Jar>,
    base_url: Url,
    referer: String,
}

impl Session {
    /// Creates a session against the default API host with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the client cannot be built (TLS backend
    /// initialization failure).
    #[allow(clippy::expect_used)]
    pub fn new() -> Result<Self, reqwest::Error> {
        let base = Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL");
        Self::with_base_url(base, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Creates a session against `base_url` with a whole-request timeout.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the client cannot be built.
    #[instrument(level = "debug", fields(base_url = %base_url))]
    pub fn with_base_url(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .cookie_provider(Arc::clone(&cookies))
            .build()?;
        let referer = format!("{}{REFERER_PATH}", base_url.as_str().trim_end_matches('/'));
        debug!(%referer, "session created");
        Ok(Self {
            client,
            cookies,
            base_url,
            referer,
        })
    }

    /// API host this session talks to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the product detail endpoint for `identifier`.
    #[must_use]
    pub fn product_url(&self, identifier: &str) -> String {
        format!(
            "{}/api/products/{identifier}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    /// Shared cookie jar; cookies set by responses are visible here.
    #[must_use]
    pub fn cookies(&self) -> &Arc<Jar> {
        &self.cookies
    }

    /// Builds a GET for `url` with the browser header set and a freshly drawn user agent.
    #[must_use]
    pub fn prepare_request(&self, url: &Url) -> RequestBuilder {
        let user_agent = random_browser_user_agent();
        let mut request = self
            .client
            .get(url.clone())
            .header(USER_AGENT, user_agent)
            .header(REFERER, self.referer.as_str());
        for (name, value) in COMMON_HEADERS {
            request = request.header(name, value);
        }
        request
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::header::{ACCEPT, PRAGMA};

    use super::*;
    use crate::user_agent::BROWSER_USER_AGENTS;

    fn session(base: &str) -> Session {
        Session::with_base_url(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_product_url_joins_base_without_double_slash() {
        let s = session("https://shop.example.com/");
        assert_eq!(
            s.product_url("AB1234"),
            "https://shop.example.com/api/products/AB1234"
        );
    }

    #[test]
    fn test_prepare_request_sets_browser_headers() {
        let s = session("https://shop.example.com");
        let url = Url::parse("https://shop.example.com/api/products/AB1234").unwrap();
        let request = s.prepare_request(&url).build().unwrap();
        let headers = request.headers();

        let ua = headers.get(USER_AGENT).unwrap().to_str().unwrap();
        assert!(BROWSER_USER_AGENTS.contains(&ua), "unexpected UA: {ua}");
        assert_eq!(
            headers.get(REFERER).unwrap(),
            "https://shop.example.com/s/men/"
        );
        assert_eq!(headers.get("sec-fetch-mode").unwrap(), "cors");
        assert_eq!(headers.get(PRAGMA).unwrap(), "no-cache");
        assert_eq!(
            headers.get(ACCEPT).unwrap(),
            "application/json, text/plain, */*"
        );
        assert_eq!(request.method(), reqwest::Method::GET);
    }

    #[test]
    fn test_default_session_targets_default_host() {
        let s = Session::new().unwrap();
        assert_eq!(s.base_url().as_str(), "https://www.adidas.jp/");
    }
}
