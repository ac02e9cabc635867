// ABOUTME: Page fetching: one blocking HTTP GET with browser-like headers and a timeout.
// ABOUTME: Transport failures map to Network errors, non-2xx responses to HttpStatus errors.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use url::Url;

use crate::diagnostics::Diagnostics;
use crate::error::{HarvestError, Result};
use crate::options::Options;

/// Per-request settings for [`fetch_page`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub user_agent: String,
    pub timeout: Duration,
}

impl From<&Options> for FetchOptions {
    fn from(opts: &Options) -> Self {
        Self {
            headers: opts.headers.clone(),
            user_agent: opts.user_agent.clone(),
            timeout: opts.timeout,
        }
    }
}

/// Builds the blocking HTTP client used when none is supplied.
pub fn build_client(opts: &Options) -> Result<Client> {
    Client::builder()
        .timeout(opts.timeout)
        .build()
        .map_err(|e| {
            HarvestError::network(
                opts.url.as_str(),
                "Client",
                Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
            )
        })
}

/// Checks that `url` is an absolute http(s) URL.
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| {
        HarvestError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(HarvestError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        )),
    }
}

/// Headers for one request: the User-Agent, then the caller's headers.
///
/// A caller header with the same name replaces the earlier value, so each
/// name is sent once. Names or values that are not valid HTTP are skipped.
pub fn request_headers(opts: &FetchOptions, diag: &dyn Diagnostics) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&opts.user_agent) {
        Ok(value) => {
            headers.insert(USER_AGENT, value);
        }
        Err(_) => diag.warn(&format!("Ignoring invalid User-Agent: {:?}", opts.user_agent)),
    }
    for (key, value) in &opts.headers {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => diag.warn(&format!("Ignoring invalid header {}: {:?}", key, value)),
        }
    }
    headers
}

/// Fetches `url` once and returns the decoded body.
///
/// No retries. The body is only returned for success-class statuses.
pub fn fetch_page(
    client: &Client,
    url: &str,
    opts: &FetchOptions,
    diag: &dyn Diagnostics,
) -> Result<String> {
    validate_url(url)?;
    diag.info(&format!("Fetching page: {}", url));

    let request = client
        .get(url)
        .timeout(opts.timeout)
        .headers(request_headers(opts, diag));

    let response = request.send().map_err(|e| {
        let source = if e.is_timeout() {
            anyhow::anyhow!("request timed out after {:?}", opts.timeout)
        } else {
            anyhow::anyhow!("request failed: {}", e)
        };
        diag.error(&format!("Error fetching page: {}", source));
        HarvestError::network(url, "Fetch", Some(source))
    })?;

    let status = response.status();
    if !status.is_success() {
        diag.error(&format!("Unexpected status code: {}", status.as_u16()));
        return Err(HarvestError::http_status(url, "Fetch", status.as_u16()));
    }

    let body = response.text().map_err(|e| {
        HarvestError::network(
            url,
            "Fetch",
            Some(anyhow::anyhow!("failed to read body: {}", e)),
        )
    })?;

    diag.info(&format!(
        "Successfully fetched page. Status code: {}",
        status.as_u16()
    ));
    Ok(body)
}
