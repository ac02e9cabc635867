// ABOUTME: Data types produced by the pipeline: Repository records, skip bookkeeping, and the RunReport.
// ABOUTME: Repository serializes to the fixed repository_name,link CSV columns.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub use crate::error::Result;

/// A validated repository entry taken from the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(rename = "repository_name")]
    pub name: String,
    pub link: String,
}

/// Why a candidate node did not become a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    MissingName,
    MissingLink,
    InvalidLink(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingName => write!(f, "no usable name"),
            SkipReason::MissingLink => write!(f, "no usable link"),
            SkipReason::InvalidLink(href) => write!(f, "link {:?} is not an absolute URL", href),
        }
    }
}

/// A skipped candidate. `index` is the candidate's 1-based position within
/// the winning strategy's matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSkip {
    pub index: usize,
    pub reason: SkipReason,
}

/// Outcome of running the extractor over one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// Name of the strategy whose candidates were used.
    pub strategy: &'static str,
    /// Number of candidates that strategy matched.
    pub candidates: usize,
    pub records: Vec<Repository>,
    pub skipped: Vec<CandidateSkip>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub source: String,
    pub output: PathBuf,
    pub generated_at: DateTime<Local>,
    pub strategy: &'static str,
    pub skipped: usize,
    pub records: Vec<Repository>,
}
