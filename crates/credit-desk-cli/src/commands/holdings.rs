use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use credit_desk_core::config::DeskConfig;
use credit_desk_core::holdings::evaluate::{evaluate_holdings, EvaluationInput};
use credit_desk_core::holdings::filter::FilterParams;
use credit_desk_core::holdings::normalize::normalize_records;
use credit_desk_core::holdings::record::IndexType;
use credit_desk_core::recovery::swap_screen::{screen_swaps, SwapCandidate, SwapScreenInput};

use crate::input;
use crate::output::export;

/// Arguments for evaluating a holdings export
#[derive(Args)]
pub struct EvaluateArgs {
    /// Holdings export (.xlsx, .xls, .ods, .csv or .json)
    #[arg(long)]
    pub input: String,

    /// Worksheet to read from a workbook (defaults to the configured sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Evaluation date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Maximum duration in years
    #[arg(long)]
    pub max_duration: Option<Decimal>,

    /// Minimum annualized return, in percent
    #[arg(long)]
    pub min_roi: Option<Decimal>,

    /// Minimum realized return, in percent
    #[arg(long)]
    pub min_return: Option<Decimal>,

    /// Benchmark: cdi+, ipca+, pre or todos
    #[arg(long)]
    pub index: Option<String>,

    /// Issuer name contains (case-insensitive)
    #[arg(long)]
    pub issuer: Option<String>,

    /// Asset name contains (case-insensitive)
    #[arg(long)]
    pub asset: Option<String>,

    /// Write the filtered view to this CSV file
    #[arg(long)]
    pub export: Option<String>,

    /// Field delimiter for CSV inputs
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
}

/// Arguments for screening holdings against a replacement asset
#[derive(Args)]
pub struct SwapScreenArgs {
    /// Holdings export (.xlsx, .xls, .ods, .csv or .json)
    #[arg(long)]
    pub input: String,

    /// Gross annual rate of the replacement, in percent
    #[arg(long, alias = "new-rate")]
    pub taxa_nova: Decimal,

    /// Benchmark of the replacement: cdi+, ipca+ or pre
    #[arg(long)]
    pub index: Option<String>,

    /// Duration of the replacement, in years
    #[arg(long)]
    pub duration: Option<Decimal>,

    /// Worksheet to read from a workbook (defaults to the configured sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Field delimiter for CSV inputs
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
}

pub fn run_evaluate(args: EvaluateArgs, desk: &DeskConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let sheet = args.sheet.as_deref().unwrap_or(&desk.sheet_name);
    let records = input::read_records(&args.input, sheet, delimiter_byte(args.delimiter)?)?;

    let filters = FilterParams {
        max_duration: args.max_duration,
        min_annualized_return: args.min_roi,
        min_realized_return: args.min_return,
        index_type: parse_index(args.index.as_deref())?,
        issuer_contains: args.issuer,
        asset_contains: args.asset,
    }
    .or(&desk.filters);

    let evaluation = EvaluationInput {
        records,
        evaluation_date: args.as_of.unwrap_or_else(|| Local::now().date_naive()),
        filters,
        business_days: desk.business_days,
    };
    let result = evaluate_holdings(&evaluation)?;

    if let Some(ref path) = args.export {
        export::export_csv(path, &result.result.rows)?;
    }

    Ok(serde_json::to_value(result)?)
}

pub fn run_swap_screen(args: SwapScreenArgs, desk: &DeskConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let sheet = args.sheet.as_deref().unwrap_or(&desk.sheet_name);
    let records = input::read_records(&args.input, sheet, delimiter_byte(args.delimiter)?)?;
    let batch = normalize_records(&records);

    let screen = SwapScreenInput {
        holdings: batch.records,
        candidate: SwapCandidate {
            index_type: parse_index(args.index.as_deref())?,
            gross_rate_pct: args.taxa_nova,
            duration_years: args.duration,
        },
    };
    let result = screen_swaps(&screen)?;
    Ok(serde_json::to_value(result)?)
}

/// `todos` (all) and an absent flag both mean no benchmark constraint.
fn parse_index(raw: Option<&str>) -> Result<Option<IndexType>, Box<dyn std::error::Error>> {
    match raw {
        None => Ok(None),
        Some(s) => Ok(IndexType::parse_filter(s)?),
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8, Box<dyn std::error::Error>> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(format!("Delimiter '{delimiter}' must be a single ASCII character").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_index_accepts_todos() {
        assert_eq!(parse_index(Some("Todos")).unwrap(), None);
        assert_eq!(parse_index(Some("ipca+")).unwrap(), Some(IndexType::IpcaPlus));
        assert!(parse_index(Some("selic")).is_err());
    }

    #[test]
    fn test_evaluate_csv_with_export() {
        let mut holdings = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(holdings, "Tipo;Ativo;Emissor;Duration;Valor Total Mercado").unwrap();
        writeln!(holdings, "CRA;CRA-X;Beta Agro;1,5;1.000,00").unwrap();
        writeln!(holdings, "CRI;CRI-Y;Delta;6;2.000,00").unwrap();
        writeln!(holdings, "Fundo;FUNDO;Gestora;;500").unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let export_path = out_dir.path().join("view.csv");

        let args = EvaluateArgs {
            input: holdings.path().to_str().unwrap().to_string(),
            sheet: None,
            as_of: NaiveDate::from_ymd_opt(2024, 6, 28),
            max_duration: Some(Decimal::from(2)),
            min_roi: None,
            min_return: None,
            index: Some("todos".into()),
            issuer: None,
            asset: None,
            export: Some(export_path.to_str().unwrap().to_string()),
            delimiter: ';',
        };
        let value = run_evaluate(args, &DeskConfig::default()).unwrap();
        assert_eq!(value["result"]["rows_read"], 3);
        assert_eq!(value["result"]["rows_matched"], 1);
        assert_eq!(value["result"]["summary"]["total_market_value_display"], "R$ 1.000,00");

        let exported = std::fs::read_to_string(&export_path).unwrap();
        let mut lines = exported.lines();
        assert!(lines.next().unwrap().starts_with("Conta,Tipo,Emissor,Ativo"));
        assert!(lines.next().unwrap().contains("CRA-X"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_config_filters_apply_under_flags() {
        let mut holdings = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(holdings, "Tipo,Ativo,Indexador").unwrap();
        writeln!(holdings, "CRA,CRA-X,CDI+ 1%").unwrap();
        writeln!(holdings, "CRI,CRI-Y,IPCA+ 6%").unwrap();
        let desk = DeskConfig {
            filters: FilterParams {
                index_type: Some(IndexType::IpcaPlus),
                ..Default::default()
            },
            ..Default::default()
        };
        let args = EvaluateArgs {
            input: holdings.path().to_str().unwrap().to_string(),
            sheet: None,
            as_of: NaiveDate::from_ymd_opt(2024, 6, 28),
            max_duration: None,
            min_roi: None,
            min_return: None,
            index: None,
            issuer: None,
            asset: None,
            export: None,
            delimiter: ',',
        };
        let value = run_evaluate(args, &desk).unwrap();
        assert_eq!(value["result"]["rows_matched"], 1);
        assert_eq!(value["result"]["rows"][0]["Ativo"], "CRI-Y");
    }

    #[test]
    fn test_swap_screen_from_json_holdings() {
        let mut holdings = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            holdings,
            r#"[
                {{"Tipo": "CRI", "Ativo": "CRI-Y", "Taxa Compra": 0.09, "Valor PU Curva": 1000, "Valor PU Mercado": 960}},
                {{"Tipo": "CRA", "Ativo": "CRA-X", "Taxa Compra": 0.08, "Valor PU Curva": 1000, "Valor PU Mercado": 1001}}
            ]"#
        )
        .unwrap();
        let args = SwapScreenArgs {
            input: holdings.path().to_str().unwrap().to_string(),
            taxa_nova: Decimal::from(11),
            index: Some("ipca+".into()),
            duration: None,
            sheet: None,
            delimiter: ',',
        };
        let value = run_swap_screen(args, &DeskConfig::default()).unwrap();
        assert_eq!(value["result"]["holdings_at_discount"], 1);
        assert_eq!(value["result"]["rows"][0]["asset"], "CRI-Y");
    }
}
