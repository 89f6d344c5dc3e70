use std::fs;

use credit_desk_core::config::DeskConfig;
use tracing::info;

use crate::input::file::resolve_path;

/// Load desk defaults from a YAML file; no file means built-in defaults.
pub fn load_config(path: Option<&str>) -> Result<DeskConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(DeskConfig::default());
    };
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let config = parse_config(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    info!(path = %canonical.display(), "loaded desk config");
    Ok(config)
}

fn parse_config(contents: &str) -> Result<DeskConfig, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(DeskConfig::default());
    }
    serde_yaml::from_str(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_desk_core::calendar::BusinessDayConvention;
    use credit_desk_core::holdings::record::IndexType;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_no_path_gives_defaults() {
        assert_eq!(load_config(None).unwrap(), DeskConfig::default());
    }

    #[test]
    fn test_yaml_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "sheet_name: Posicao\nbusiness_days: half_open\ncaution_threshold_years: 3\nfilters:\n  index_type: IPCA+\n  max_duration: 4"
        )
        .unwrap();
        let cfg = load_config(file.path().to_str()).unwrap();
        assert_eq!(cfg.sheet_name, "Posicao");
        assert_eq!(cfg.business_days, BusinessDayConvention::HalfOpen);
        assert_eq!(cfg.caution_threshold_years, dec!(3));
        assert_eq!(cfg.filters.index_type, Some(IndexType::IpcaPlus));
        assert_eq!(cfg.filters.max_duration, Some(dec!(4)));
        assert_eq!(cfg.max_simulation_months, 12_000);
    }

    #[test]
    fn test_todos_index_in_config_means_no_constraint() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "filters:\n  index_type: Todos\n  max_duration: 3").unwrap();
        let cfg = load_config(file.path().to_str()).unwrap();
        assert_eq!(cfg.filters.index_type, None);
        assert_eq!(cfg.filters.max_duration, Some(dec!(3)));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(load_config(file.path().to_str()).unwrap(), DeskConfig::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config(Some("/nonexistent/desk.yaml")).is_err());
    }
}
