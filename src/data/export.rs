use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::model::ListingTable;

/// Write the given rows as CSV with the source header, in the given order.
pub fn write_csv<W: Write>(table: &ListingTable, rows: &[usize], writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&table.columns)
        .context("writing CSV header")?;
    for &r in rows {
        let listing = table
            .rows
            .get(r)
            .with_context(|| format!("row {r} is out of range"))?;
        out.write_record(listing.cells.iter().map(|c| c.export_text()))
            .with_context(|| format!("writing CSV row {r}"))?;
    }
    out.flush().context("flushing CSV")?;
    Ok(())
}

/// Export the rows to a CSV file.
pub fn export_csv(table: &ListingTable, rows: &[usize], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, rows, std::io::BufWriter::new(file))?;
    log::info!("Exported {} listings to {}", rows.len(), path.display());
    Ok(())
}

/// Suggested export file name derived from the source file.
pub fn default_export_name(source: Option<&Path>) -> PathBuf {
    let stem = source
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .unwrap_or("listings");
    PathBuf::from(format!("filtered_{stem}.csv"))
}
