// ABOUTME: Main library entry point for the trending repository harvester.
// ABOUTME: Re-exports the public API: Harvester, HarvesterBuilder, Extractor, Repository, HarvestError, Diagnostics.

//! Trending harvest - fetch a repository listing page and save its top entries as CSV.
//!
//! The pipeline is linear: fetch → extract → normalize → write. Extraction
//! tries an ordered list of selector strategies and keeps the first one that
//! matches; malformed entries are skipped rather than aborting the run.
//!
//! # Example
//!
//! ```no_run
//! use trending_harvest::{Harvester, HarvestError, TracingDiagnostics};
//!
//! fn main() -> Result<(), HarvestError> {
//!     let harvester = Harvester::builder().max_records(5).build()?;
//!     let report = harvester.run(&TracingDiagnostics)?;
//!     println!("saved {} repositories to {}", report.records.len(), report.output.display());
//!     Ok(())
//! }
//! ```

pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod harvester;
pub mod normalize;
pub mod options;
pub mod result;
pub mod selectors;
pub mod sink;

pub use crate::diagnostics::{Diagnostics, MemoryDiagnostics, NullDiagnostics, TracingDiagnostics};
pub use crate::error::{ErrorCode, HarvestError};
pub use crate::extract::{builtin_strategies, Extractor, Strategy};
pub use crate::harvester::Harvester;
pub use crate::options::{HarvesterBuilder, Options};
pub use crate::result::{CandidateSkip, Extraction, Repository, Result, RunReport, SkipReason};
pub use crate::sink::{read_csv, write_csv, write_records};
