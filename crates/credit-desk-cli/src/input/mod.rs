pub mod csv_in;
pub mod file;
pub mod spreadsheet;
pub mod stdin;

use std::path::Path;

use credit_desk_core::holdings::record::RawRecord;
use tracing::info;

/// Read a holdings export, choosing the reader from the file extension.
pub fn read_records(
    path: &str,
    sheet: &str,
    delimiter: u8,
) -> Result<Vec<RawRecord>, Box<dyn std::error::Error>> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let records: Vec<RawRecord> = match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => spreadsheet::read_sheet(path, sheet)?,
        "csv" | "txt" => csv_in::read_csv(path, delimiter)?,
        "json" => file::read_json(path)?,
        other => {
            return Err(format!(
                "Unsupported input format '.{other}'. Use .xlsx, .xls, .ods, .csv or .json"
            )
            .into())
        }
    };

    info!(path, rows = records.len(), "read holdings");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_desk_core::holdings::record::RawCell;
    use std::io::Write;

    #[test]
    fn test_dispatch_on_json_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"Tipo": "CRA", "Duration": 2.5}}]"#).unwrap();
        let records = read_records(file.path().to_str().unwrap(), "Export", b',').unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Duration"), &RawCell::Number(2.5));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let err = read_records(file.path().to_str().unwrap(), "Export", b',').unwrap_err();
        assert!(err.to_string().contains("Unsupported input format"));
    }
}
