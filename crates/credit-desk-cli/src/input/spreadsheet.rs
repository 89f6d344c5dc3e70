use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use credit_desk_core::holdings::record::{RawCell, RawRecord};
use tracing::debug;

use super::file::resolve_path;

/// Read one worksheet of a workbook; the first row holds the headers.
pub fn read_sheet(path: &str, sheet: &str) -> Result<Vec<RawRecord>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let mut workbook = open_workbook_auto(&canonical)
        .map_err(|e| format!("Failed to open '{}': {}", canonical.display(), e))?;
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| format!("Sheet '{}' not found in '{}': {}", sheet, canonical.display(), e))?;
    debug!(sheet, rows = range.height(), cols = range.width(), "read worksheet");
    Ok(records_from_range(&range))
}

pub fn records_from_range(range: &Range<Data>) -> Vec<RawRecord> {
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Vec::new(),
    };

    rows.map(|row| {
        let mut record = RawRecord::new();
        for (header, cell) in headers.iter().zip(row) {
            if !header.is_empty() {
                record.insert(header, to_raw_cell(cell));
            }
        }
        record
    })
    .filter(|r| !r.is_blank())
    .collect()
}

fn to_raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::Bool(b) => RawCell::Bool(*b),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::String(s) => RawCell::Text(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(RawCell::Date)
            .unwrap_or_else(|| RawCell::Text(cell.to_string())),
        Data::DurationIso(s) => RawCell::Text(s.clone()),
        // #N/A and friends survive as text so the normalizer reports them
        Data::Error(e) => RawCell::Text(e.to_string()),
    }
}
