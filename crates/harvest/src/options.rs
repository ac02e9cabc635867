// ABOUTME: Configuration for a harvest run: target URL, origin, record limit, timeout, headers, output naming.
// ABOUTME: HarvesterBuilder provides a fluent API for constructing Harvester instances with custom settings.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::harvester::Harvester;
use crate::normalize::origin_of;

pub const DEFAULT_URL: &str = "https://github.com/trending";
pub const DEFAULT_MAX_RECORDS: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_OUTPUT_PATTERN: &str = "trending_repositories_{timestamp}.csv";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Placeholder replaced in the output pattern.
pub const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Headers sent with every request unless overridden.
///
/// Accept-Encoding is left to reqwest so responses are decompressed.
fn browser_headers() -> HashMap<String, String> {
    [
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.5"),
        ("Connection", "keep-alive"),
        ("Upgrade-Insecure-Requests", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Configuration options for a harvest run.
#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    /// Origin used to absolutize root-relative links. Derived from `url` when unset.
    pub origin: Option<String>,
    pub max_records: usize,
    pub timeout: Duration,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub output_dir: PathBuf,
    pub output_pattern: String,
    pub http_client: Option<reqwest::blocking::Client>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            origin: None,
            max_records: DEFAULT_MAX_RECORDS,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: browser_headers(),
            output_dir: PathBuf::from("."),
            output_pattern: DEFAULT_OUTPUT_PATTERN.to_string(),
            http_client: None,
        }
    }
}

impl Options {
    /// The configured origin, or scheme + host (+ port) of `url`.
    pub fn resolved_origin(&self) -> Option<String> {
        match &self.origin {
            Some(origin) => Some(origin.trim_end_matches('/').to_string()),
            None => origin_of(&self.url),
        }
    }

    /// Output file path for a run started at `now`.
    pub fn output_path(&self, now: DateTime<Local>) -> PathBuf {
        let stamp = now.format(TIMESTAMP_FORMAT).to_string();
        let file_name = self.output_pattern.replace(TIMESTAMP_PLACEHOLDER, &stamp);
        self.output_dir.join(file_name)
    }
}

/// Builder for constructing Harvester instances with custom configuration.
#[derive(Debug, Clone)]
pub struct HarvesterBuilder {
    opts: Options,
}

impl HarvesterBuilder {
    /// Create a new HarvesterBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the listing page URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.opts.url = url.into();
        self
    }

    /// Override the origin used for root-relative links.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.opts.origin = Some(origin.into());
        self
    }

    /// Set the maximum number of records kept. Values below 1 are raised to 1.
    pub fn max_records(mut self, max: usize) -> Self {
        self.opts.max_records = max.max(1);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add or replace a header sent with the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Directory the output file is written into.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.opts.output_dir = dir.into();
        self
    }

    /// File name pattern; `{timestamp}` is replaced at write time.
    pub fn output_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.opts.output_pattern = pattern.into();
        self
    }

    /// Use a preconfigured HTTP client. Timeout and User-Agent must then be set on it.
    pub fn http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Build the Harvester with the configured options.
    pub fn build(self) -> Result<Harvester> {
        Harvester::new(self.opts)
    }
}

impl Default for HarvesterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
