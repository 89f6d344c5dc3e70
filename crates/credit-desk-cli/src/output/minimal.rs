use serde_json::Value;

use super::table::format_value;

/// Key answer of each command, in priority order.
const PRIORITY_KEYS: [&str; 4] = [
    "recovery_time_years",
    "advisory",
    "summary",
    "holdings_at_discount",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, then falls
/// back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    println!("{}", minimal_answer(result_obj));
}

fn minimal_answer(result: &Value) -> String {
    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            match map.get(key) {
                Some(Value::Null) | None => continue,
                Some(Value::Object(summary)) if key == "summary" => {
                    return format!(
                        "{} positions, {} assets, {}",
                        format_value(summary.get("total_positions").unwrap_or(&Value::Null)),
                        format_value(summary.get("unique_assets").unwrap_or(&Value::Null)),
                        format_value(
                            summary
                                .get("total_market_value_display")
                                .unwrap_or(&Value::Null)
                        ),
                    );
                }
                Some(val) => return format_value(val),
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_value(val));
        }
    }

    format_value(result)
}
