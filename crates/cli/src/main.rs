// ABOUTME: CLI for the trending repository harvester.
// ABOUTME: Fetches the listing page (or reads a local HTML file), writes the CSV, and prints a summary.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trending_harvest::options::{
    DEFAULT_MAX_RECORDS, DEFAULT_OUTPUT_PATTERN, DEFAULT_URL, DEFAULT_USER_AGENT,
};
use trending_harvest::{Harvester, RunReport, TracingDiagnostics};

/// Save the top trending repositories from a listing page as CSV.
#[derive(Parser, Debug)]
#[command(name = "trending")]
#[command(about = "Scrape the top trending repositories into a CSV file", long_about = None)]
struct Args {
    /// Listing page to fetch.
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Origin prepended to root-relative links (default: scheme and host of --url).
    #[arg(long)]
    origin: Option<String>,

    /// Maximum number of repositories to keep.
    #[arg(short = 'n', long = "top", default_value_t = DEFAULT_MAX_RECORDS as u64,
          value_parser = clap::value_parser!(u64).range(1..))]
    top: u64,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Directory the CSV is written into; created if missing.
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    output_dir: PathBuf,

    /// Output file name; {timestamp} becomes YYYYMMDD_HHMMSS.
    #[arg(long, default_value = DEFAULT_OUTPUT_PATTERN)]
    pattern: String,

    /// User-Agent header sent with the request.
    #[arg(long = "user-agent", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Parse this HTML file instead of fetching --url.
    #[arg(long)]
    html: Option<PathBuf>,

    /// Print the run report as JSON instead of the text summary.
    #[arg(long = "json")]
    json_output: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(report) => {
            if args.json_output {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!(error = %e, "Failed to serialize report");
                        return ExitCode::from(1);
                    }
                }
            } else {
                print_summary(&report);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Scraping failed: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Compact tracing to stderr, filtered by `RUST_LOG` (default "info").
///
/// Stdout is reserved for the summary so it can be piped.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn run(args: &Args) -> Result<RunReport> {
    let mut builder = Harvester::builder()
        .url(args.url.as_str())
        .max_records(args.top as usize)
        .timeout(Duration::from_secs(args.timeout))
        .output_dir(&args.output_dir)
        .output_pattern(args.pattern.as_str())
        .user_agent(args.user_agent.as_str());
    if let Some(origin) = &args.origin {
        builder = builder.origin(origin.as_str());
    }
    let harvester = builder.build()?;

    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("creating output directory {}", args.output_dir.display())
    })?;

    let diag = TracingDiagnostics;
    let report = match &args.html {
        Some(path) => {
            let html = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            harvester.run_html(&html, path.display().to_string(), &diag)?
        }
        None => harvester.run(&diag)?,
    };
    Ok(report)
}

fn print_summary(report: &RunReport) {
    println!(
        "\nSuccessfully scraped {} trending repositories!",
        report.records.len()
    );
    println!("Saved to: {}", report.output.display());
    println!("Results:");
    println!("{}", "-".repeat(80));
    for (i, repo) in report.records.iter().enumerate() {
        println!("{}. {}", i + 1, repo.name);
        println!("   {}", repo.link);
        println!();
    }
}
