// ABOUTME: End-to-end tests for the harvest pipeline against a mock HTTP server.
// ABOUTME: Covers the record limit, strategy fallback, fatal failures, and the CSV written to disk.

use std::fs;
use std::time::Duration;

use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use trending_harvest::{read_csv, ErrorCode, Harvester, MemoryDiagnostics, Repository};

fn box_row(owner: &str, repo: &str) -> String {
    format!(
        r#"<article class="Box-row">
            <div class="float-right">
                <a href="/login?return_to=%2F{owner}%2F{repo}" class="btn-sm">Star</a>
            </div>
            <h2 class="h3 lh-condensed">
                <a data-view-component="true" href="/{owner}/{repo}">
                    <svg aria-hidden="true"></svg>
                    <span data-view-component="true" class="text-normal">
                        {owner} /
                    </span>
                    {repo}
                </a>
            </h2>
            <p class="col-9 color-fg-muted my-1 pr-4">A project description.</p>
            <div class="f6 color-fg-muted mt-2">
                <a href="/{owner}/{repo}/stargazers">1,024</a>
                <a href="/{owner}/{repo}/forks">64</a>
            </div>
        </article>"#
    )
}

fn trending_page(rows: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><title>Trending repositories on GitHub today</title></head>
<body>
<div class="application-main">
  <div class="Box">{}</div>
</div>
</body>
</html>"#,
        rows
    )
}

fn serve(server: &MockServer, body: String) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/trending");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(body);
    })
}

fn harvester_for(server: &MockServer, dir: &TempDir) -> Harvester {
    Harvester::builder()
        .url(server.url("/trending"))
        .origin("https://github.com")
        .timeout(Duration::from_secs(5))
        .output_dir(dir.path())
        .build()
        .unwrap()
}

#[test]
fn seven_primary_candidates_yield_five_rows_in_order() {
    let server = MockServer::start();
    let rows: String = (1..=7).map(|i| box_row("org", &format!("project-{}", i))).collect();
    let mock = serve(&server, trending_page(&rows));
    let dir = TempDir::new().unwrap();

    let report = harvester_for(&server, &dir)
        .run(&MemoryDiagnostics::new())
        .unwrap();
    mock.assert();

    let expected: Vec<Repository> = (1..=5)
        .map(|i| Repository {
            name: format!("org / project-{}", i),
            link: format!("https://github.com/org/project-{}", i),
        })
        .collect();
    assert_eq!(report.records, expected);
    assert_eq!(report.strategy, "article.Box-row");
    assert_eq!(read_csv(&report.output).unwrap(), expected);

    let text = fs::read_to_string(&report.output).unwrap();
    assert!(text.starts_with("repository_name,link\n"));
    assert_eq!(text.lines().count(), 6);
}

#[test]
fn fallback_strategy_rows_only() {
    let server = MockServer::start();
    let rows = r#"
        <div data-testid="repository-item"><h3><a href="/one/a">one / a</a></h3></div>
        <div data-testid="repository-item"><h3><a href="/two/b">two / b</a></h3></div>
        <div data-testid="repository-item"><h3><a href="/three/c">three / c</a></h3></div>
    "#;
    serve(&server, trending_page(rows));
    let dir = TempDir::new().unwrap();

    let report = harvester_for(&server, &dir)
        .run(&MemoryDiagnostics::new())
        .unwrap();

    let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["one / a", "two / b", "three / c"]);
    assert_eq!(report.strategy, "[data-testid=repository-item]");
}

#[test]
fn links_resolve_against_target_origin_by_default() {
    let server = MockServer::start();
    serve(&server, trending_page(&box_row("me", "tool")));
    let dir = TempDir::new().unwrap();

    let report = Harvester::builder()
        .url(server.url("/trending"))
        .output_dir(dir.path())
        .build()
        .unwrap()
        .run(&MemoryDiagnostics::new())
        .unwrap();

    assert_eq!(report.records[0].link, server.url("/me/tool"));
}

#[test]
fn unrecognised_markup_fails_without_writing() {
    let server = MockServer::start();
    serve(&server, trending_page("<p>Nothing is trending.</p>"));
    let dir = TempDir::new().unwrap();

    let err = harvester_for(&server, &dir)
        .run(&MemoryDiagnostics::new())
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NoRepositoriesFound);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn server_error_fails_without_writing() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/trending");
        then.status(500).body("boom");
    });
    let dir = TempDir::new().unwrap();

    let err = harvester_for(&server, &dir)
        .run(&MemoryDiagnostics::new())
        .unwrap_err();

    mock.assert_hits(1);
    assert_eq!(err.code, ErrorCode::HttpStatus);
    assert_eq!(err.status, Some(500));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn diagnostics_record_skipped_candidates() {
    let server = MockServer::start();
    let rows = format!(
        r#"{}<article class="Box-row"><h2><a href="/x/y"> </a></h2></article>{}"#,
        box_row("a", "first"),
        box_row("b", "second")
    );
    serve(&server, trending_page(&rows));
    let dir = TempDir::new().unwrap();
    let diag = MemoryDiagnostics::new();

    let report = harvester_for(&server, &dir).run(&diag).unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.skipped, 1);
    assert!(diag
        .messages_at(tracing::Level::WARN)
        .iter()
        .any(|m| m.contains("Skipping candidate 2")));
}
