// ABOUTME: The Harvester wires fetch, extraction, normalization and the CSV sink into one linear run.
// ABOUTME: The sink is written exactly once, after extraction succeeded with the complete record list.

use chrono::Local;
use reqwest::blocking::Client;

use crate::diagnostics::Diagnostics;
use crate::error::{HarvestError, Result};
use crate::extract::{Extractor, Strategy};
use crate::fetch::{build_client, fetch_page, validate_url, FetchOptions};
use crate::options::{HarvesterBuilder, Options};
use crate::result::{Extraction, RunReport};
use crate::sink::write_csv;

/// Fetches a listing page and turns it into a CSV of repositories.
#[derive(Debug)]
pub struct Harvester {
    opts: Options,
    http: Client,
    extractor: Extractor,
}

impl Harvester {
    /// Create a new HarvesterBuilder for configuring a Harvester.
    pub fn builder() -> HarvesterBuilder {
        HarvesterBuilder::new()
    }

    /// Create a Harvester from options.
    ///
    /// Fails with `InvalidUrl` when the target URL is not http(s) or no origin
    /// can be determined for it.
    pub fn new(opts: Options) -> Result<Self> {
        validate_url(&opts.url)?;
        let origin = opts.resolved_origin().ok_or_else(|| {
            HarvestError::invalid_url(
                opts.url.as_str(),
                "Configure",
                Some(anyhow::anyhow!("cannot derive an origin from the target URL")),
            )
        })?;
        let http = match &opts.http_client {
            Some(client) => client.clone(),
            None => build_client(&opts)?,
        };
        let extractor = Extractor::new(origin, opts.max_records);
        Ok(Self {
            opts,
            http,
            extractor,
        })
    }

    /// Replace the extractor's strategy list.
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.extractor = Extractor::with_strategies(
            self.extractor.origin().to_string(),
            self.extractor.max_records(),
            strategies,
        );
        self
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Fetches the configured URL once.
    pub fn fetch(&self, diag: &dyn Diagnostics) -> Result<String> {
        fetch_page(
            &self.http,
            &self.opts.url,
            &FetchOptions::from(&self.opts),
            diag,
        )
    }

    /// Fetches and extracts without writing anything.
    pub fn harvest(&self, diag: &dyn Diagnostics) -> Result<Extraction> {
        let html = self.fetch(diag)?;
        self.extractor.extract(&html, diag)
    }

    /// Full run: fetch, extract, write.
    pub fn run(&self, diag: &dyn Diagnostics) -> Result<RunReport> {
        diag.info("Starting trending repositories scraper");
        diag.info(&format!("Target: Top {} repositories", self.opts.max_records));
        let html = self.fetch(diag)?;
        self.finish(&html, self.opts.url.clone(), diag)
    }

    /// Full run over markup already in hand; `source` names where it came from.
    pub fn run_html(
        &self,
        html: &str,
        source: impl Into<String>,
        diag: &dyn Diagnostics,
    ) -> Result<RunReport> {
        self.finish(html, source.into(), diag)
    }

    fn finish(&self, html: &str, source: String, diag: &dyn Diagnostics) -> Result<RunReport> {
        let extraction = self.extractor.extract(html, diag)?;

        let generated_at = Local::now();
        let output = self.opts.output_path(generated_at);
        write_csv(&output, &extraction.records, diag)?;

        Ok(RunReport {
            source,
            output,
            generated_at,
            strategy: extraction.strategy,
            skipped: extraction.skipped.len(),
            records: extraction.records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullDiagnostics;
    use crate::selectors::select_all;
    use tempfile::TempDir;

    #[test]
    fn rejects_non_http_target() {
        let err = Harvester::builder().url("file:///tmp/page.html").build().unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[test]
    fn origin_follows_target_url() {
        let harvester = Harvester::builder()
            .url("http://localhost:8123/trending")
            .build()
            .unwrap();
        assert_eq!(harvester.extractor().origin(), "http://localhost:8123");
    }

    #[test]
    fn run_html_writes_one_file() {
        let dir = TempDir::new().unwrap();
        let harvester = Harvester::builder()
            .output_dir(dir.path())
            .output_pattern("repos.csv")
            .build()
            .unwrap();

        let report = harvester
            .run_html(
                r#"<article class="Box-row"><h2><a href="/a/b">a / b</a></h2></article>"#,
                "inline",
                &NullDiagnostics,
            )
            .unwrap();

        assert_eq!(report.output, dir.path().join("repos.csv"));
        assert_eq!(report.strategy, "article.Box-row");
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].link, "https://github.com/a/b");
        assert!(report.output.exists());
    }

    #[test]
    fn failed_extraction_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let harvester = Harvester::builder()
            .output_dir(dir.path())
            .build()
            .unwrap();

        let err = harvester
            .run_html("<html><body></body></html>", "inline", &NullDiagnostics)
            .unwrap_err();

        assert!(err.is_no_repositories());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn custom_strategies_are_kept_with_origin_and_limit() {
        let harvester = Harvester::builder()
            .max_records(2)
            .build()
            .unwrap()
            .with_strategies(vec![Strategy::new("paragraphs", |doc| select_all(doc, "p"))]);

        let extraction = harvester
            .extractor()
            .extract(
                r#"<p><a href="/a/1">a / 1</a></p><p><a href="/b/2">b / 2</a></p><p><a href="/c/3">c / 3</a></p>"#,
                &NullDiagnostics,
            )
            .unwrap();

        assert_eq!(extraction.strategy, "paragraphs");
        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.records[1].link, "https://github.com/b/2");
    }
}
