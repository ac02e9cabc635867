// ABOUTME: Repository extraction from listing-page markup using ordered fallback strategies.
// ABOUTME: First strategy with candidates wins; each candidate is mapped to a record through field sub-matchers.

//! Repository extraction.
//!
//! Key behaviors:
//! - Strategies are tried in order; the first one that matches at least one
//!   node supplies every candidate. Later strategies are never consulted, so
//!   overlapping selectors cannot produce duplicates.
//! - Name and link are pulled by separate chains of sub-matchers. A name
//!   read from an anchor takes its link from that anchor when it resolves.
//! - Each link sub-matcher's hrefs are validated in turn; a candidate is
//!   rejected only when none of them resolves.
//! - A candidate without a usable name or link is skipped and does not count
//!   toward `max_records`.
//! - Candidates after the `max_records`-th valid one are not processed.

use std::fmt;

use scraper::{ElementRef, Html};

use crate::diagnostics::Diagnostics;
use crate::error::{HarvestError, Result};
use crate::normalize::{collapse_whitespace, resolve_link};
use crate::result::{CandidateSkip, Extraction, Repository, SkipReason};
use crate::selectors::{select_all, select_within};

/// Selects candidate nodes from a parsed document.
pub type CandidateMatcher = Box<dyn for<'a> Fn(&'a Html) -> Vec<ElementRef<'a>> + Send + Sync>;

/// A named rule selecting candidate nodes by structural pattern.
pub struct Strategy {
    pub name: &'static str,
    matcher: CandidateMatcher,
}

impl Strategy {
    pub fn new<F>(name: &'static str, matcher: F) -> Self
    where
        F: for<'a> Fn(&'a Html) -> Vec<ElementRef<'a>> + Send + Sync + 'static,
    {
        Self {
            name,
            matcher: Box::new(matcher),
        }
    }

    /// A strategy matching a single CSS selector.
    pub fn css(name: &'static str, css: &'static str) -> Self {
        Self::new(name, move |doc| select_all(doc, css))
    }

    pub fn candidates<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        (self.matcher)(doc)
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// Built-in strategies in priority order.
pub fn builtin_strategies() -> Vec<Strategy> {
    vec![
        Strategy::css("article.Box-row", "article.Box-row"),
        Strategy::css(".Box-row", ".Box-row"),
        Strategy::css("article[class*=Box-row]", r#"article[class*="Box-row"]"#),
        Strategy::css(".repo-list-item", ".repo-list-item"),
        Strategy::css(
            "[data-testid=repository-item]",
            r#"[data-testid="repository-item"]"#,
        ),
        Strategy::css("h2.h3", "h2.h3"),
    ]
}

/// A name, plus the anchor it was read from when there was one.
type NameHit<'a> = (String, Option<ElementRef<'a>>);

type NameMatcher = fn(ElementRef<'_>) -> Option<NameHit<'_>>;
type LinkMatcher = fn(ElementRef<'_>) -> Vec<String>;

const HEADING_ANCHORS: &str = "h1 a[href], h2 a[href], h3 a[href]";
const HEADINGS: &str = "h1, h2, h3";

/// Name sub-matchers, in order.
const NAME_MATCHERS: &[NameMatcher] = &[heading_anchor_text, heading_text, repo_anchor_text];

/// Link sub-matchers, in order. Consulted after the name's own anchor.
const LINK_MATCHERS: &[LinkMatcher] = &[heading_anchor_hrefs, repo_anchor_hrefs, path_like_hrefs];

fn non_empty_text(el: ElementRef<'_>) -> Option<String> {
    let text = collapse_whitespace(&el.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

fn non_empty_href(el: ElementRef<'_>) -> Option<String> {
    let href = el.value().attr("href")?.trim();
    (!href.is_empty()).then(|| href.to_string())
}

/// True for `/owner/repo`: exactly two non-empty segments, no query or fragment.
fn is_repo_path(href: &str) -> bool {
    let Some(path) = href.strip_prefix('/') else {
        return false;
    };
    if path.contains(['?', '#']) {
        return false;
    }
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    segments.len() == 2 && segments.iter().all(|s| !s.is_empty())
}

fn repo_anchors(el: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    select_within(el, "a[href]")
        .into_iter()
        .filter(|a| a.value().attr("href").is_some_and(is_repo_path))
        .collect()
}

fn heading_anchor_text(el: ElementRef<'_>) -> Option<NameHit<'_>> {
    select_within(el, HEADING_ANCHORS)
        .into_iter()
        .find_map(|a| non_empty_text(a).map(|text| (text, Some(a))))
}

fn heading_text(el: ElementRef<'_>) -> Option<NameHit<'_>> {
    select_within(el, HEADINGS)
        .into_iter()
        .find_map(|h| non_empty_text(h).map(|text| (text, None)))
}

fn repo_anchor_text(el: ElementRef<'_>) -> Option<NameHit<'_>> {
    repo_anchors(el)
        .into_iter()
        .find_map(|a| non_empty_text(a).map(|text| (text, Some(a))))
}

fn heading_anchor_hrefs(el: ElementRef<'_>) -> Vec<String> {
    select_within(el, HEADING_ANCHORS)
        .into_iter()
        .filter_map(non_empty_href)
        .collect()
}

fn repo_anchor_hrefs(el: ElementRef<'_>) -> Vec<String> {
    repo_anchors(el).into_iter().filter_map(non_empty_href).collect()
}

/// Every non-absolute anchor href containing a path separator.
fn path_like_hrefs(el: ElementRef<'_>) -> Vec<String> {
    select_within(el, "a[href]")
        .into_iter()
        .filter_map(non_empty_href)
        .filter(|href| !href.starts_with("http") && href.contains('/'))
        .collect()
}

/// Extracts repository records from listing-page markup.
#[derive(Debug)]
pub struct Extractor {
    strategies: Vec<Strategy>,
    origin: String,
    max_records: usize,
}

impl Extractor {
    /// An extractor using the built-in strategies.
    pub fn new(origin: impl Into<String>, max_records: usize) -> Self {
        Self::with_strategies(origin, max_records, builtin_strategies())
    }

    pub fn with_strategies(
        origin: impl Into<String>,
        max_records: usize,
        strategies: Vec<Strategy>,
    ) -> Self {
        Self {
            strategies,
            origin: origin.into(),
            max_records,
        }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    /// Runs the strategies over `html` and collects up to `max_records` records.
    ///
    /// Fails with `NoRepositoriesFound` when no strategy matches, or when every
    /// candidate of the winning strategy was rejected.
    pub fn extract(&self, html: &str, diag: &dyn Diagnostics) -> Result<Extraction> {
        let doc = Html::parse_document(html);

        let winner = self.strategies.iter().find_map(|strategy| {
            let candidates = strategy.candidates(&doc);
            if candidates.is_empty() {
                diag.debug(&format!("Strategy {} matched nothing", strategy.name));
                None
            } else {
                Some((strategy, candidates))
            }
        });

        let Some((strategy, candidates)) = winner else {
            diag.error("No repositories found. The page structure might have changed.");
            return Err(HarvestError::no_repositories(
                self.origin.as_str(),
                "Extract",
                Some(anyhow::anyhow!(
                    "none of {} strategies matched; the page structure might have changed",
                    self.strategies.len()
                )),
            ));
        };

        diag.info(&format!(
            "Found {} candidates using strategy: {}",
            candidates.len(),
            strategy.name
        ));

        let mut records = Vec::new();
        let mut skipped = Vec::new();
        for (idx, el) in candidates.iter().enumerate() {
            if records.len() >= self.max_records {
                break;
            }
            match self.process_candidate(*el) {
                Ok(record) => {
                    diag.info(&format!("Found repository {}: {}", records.len() + 1, record.name));
                    records.push(record);
                }
                Err(reason) => {
                    diag.warn(&format!("Skipping candidate {}: {}", idx + 1, reason));
                    skipped.push(CandidateSkip {
                        index: idx + 1,
                        reason,
                    });
                }
            }
        }

        if records.is_empty() {
            diag.error("No repositories found. Every candidate was rejected.");
            return Err(HarvestError::no_repositories(
                self.origin.as_str(),
                "Extract",
                Some(anyhow::anyhow!(
                    "all {} candidates from strategy {} were rejected",
                    candidates.len(),
                    strategy.name
                )),
            ));
        }

        diag.info(&format!("Successfully parsed {} repositories", records.len()));
        Ok(Extraction {
            strategy: strategy.name,
            candidates: candidates.len(),
            records,
            skipped,
        })
    }

    /// Name first; the link comes from the name's anchor when it resolves,
    /// otherwise from the first link sub-matcher href that resolves.
    fn process_candidate(&self, el: ElementRef<'_>) -> std::result::Result<Repository, SkipReason> {
        let (name, anchor) = NAME_MATCHERS
            .iter()
            .find_map(|m| m(el))
            .ok_or(SkipReason::MissingName)?;

        let hrefs = anchor
            .and_then(non_empty_href)
            .into_iter()
            .chain(LINK_MATCHERS.iter().flat_map(|m| m(el)));

        let mut rejected = None;
        for href in hrefs {
            match resolve_link(&self.origin, &href) {
                Some(link) => return Ok(Repository { name, link }),
                None => {
                    rejected.get_or_insert(href);
                }
            }
        }
        Err(rejected.map_or(SkipReason::MissingLink, SkipReason::InvalidLink))
    }
}
