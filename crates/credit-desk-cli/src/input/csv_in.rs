use std::fs::File;
use std::io::Read;

use credit_desk_core::holdings::record::{RawCell, RawRecord};

use super::file::resolve_path;

/// Read a delimited text export. Every cell arrives as text; coercion
/// happens in the normalizer.
pub fn read_csv(path: &str, delimiter: u8) -> Result<Vec<RawRecord>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let file = File::open(&canonical)
        .map_err(|e| format!("Failed to open '{}': {}", canonical.display(), e))?;
    records_from_reader(file, delimiter)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e).into())
}

pub fn records_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<Vec<RawRecord>, Box<dyn std::error::Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let mut record = RawRecord::new();
        for (header, value) in headers.iter().zip(row.iter()) {
            if header.is_empty() {
                continue;
            }
            let cell = if value.trim().is_empty() {
                RawCell::Empty
            } else {
                RawCell::Text(value.to_string())
            };
            record.insert(header, cell);
        }
        if !record.is_blank() {
            records.push(record);
        }
    }
    Ok(records)
}
