// ABOUTME: CSV sink writing the final record list with the fixed repository_name,link header.
// ABOUTME: Output is UTF-8 with \n terminators, written via temp file and rename; failures map to Write errors.

use std::io::Write;
use std::path::Path;

use crate::diagnostics::Diagnostics;
use crate::error::{HarvestError, Result};
use crate::result::Repository;

/// Header row of every output file.
pub const HEADER: [&str; 2] = ["repository_name", "link"];

fn csv_writer<W: Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(inner)
}

/// Serializes `records` (header first) into any writer.
///
/// The header is written explicitly so an empty list still yields it.
pub fn write_records<W: Write>(inner: W, records: &[Repository]) -> csv::Result<()> {
    let mut writer = csv_writer(inner);
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `records` to `path`, replacing any existing file.
///
/// Rows go to a temporary file beside `path` that is renamed over it once
/// complete, so `path` never holds a partial CSV. On failure the temporary
/// file is removed.
pub fn write_csv(path: &Path, records: &[Repository], diag: &dyn Diagnostics) -> Result<()> {
    let target = path.display().to_string();
    let fail = |e: anyhow::Error| {
        diag.error(&format!("Error saving to CSV: {:#}", e));
        HarvestError::write(target.as_str(), "Write", Some(e))
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".trending-")
        .suffix(".csv.tmp")
        .tempfile_in(dir)
        .map_err(|e| fail(e.into()))?;

    write_records(tmp.as_file_mut(), records).map_err(|e| fail(e.into()))?;
    tmp.persist(path).map_err(|e| fail(e.error.into()))?;

    diag.info(&format!(
        "Successfully saved {} repositories to {}",
        records.len(),
        target
    ));
    Ok(())
}

/// Reads a file produced by [`write_csv`] back into records.
pub fn read_csv(path: &Path) -> csv::Result<Vec<Repository>> {
    csv::Reader::from_path(path)?.deserialize().collect()
}
