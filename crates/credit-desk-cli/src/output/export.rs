use std::fs::File;
use std::io::Write;

use credit_desk_core::holdings::report::{DisplayRow, DISPLAY_COLUMNS};
use tracing::info;

/// Write the filtered view to `path` as CSV with the export headers.
pub fn export_csv(path: &str, rows: &[DisplayRow]) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path).map_err(|e| format!("Failed to create '{}': {}", path, e))?;
    write_rows(file, rows)?;
    info!(path, rows = rows.len(), "exported filtered view");
    Ok(())
}

pub fn write_rows<W: Write>(writer: W, rows: &[DisplayRow]) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        wtr.write_record(DISPLAY_COLUMNS)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
