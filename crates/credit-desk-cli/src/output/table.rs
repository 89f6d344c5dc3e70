use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Result arrays rendered as their own tables instead of a single cell.
const DETAIL_TABLES: [(&str, &str); 3] = [
    ("rows", "Holdings"),
    ("schedule", "Coupon schedule"),
    ("coercion_failures", "Unreadable cells"),
];

/// Result keys not shown in table form (the display rows carry them).
const HIDDEN_KEYS: [&str; 1] = ["records"];

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            // Check if "result" key holds the primary data
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    if let Value::Object(res_map) = result {
        let mut scalars = Map::new();
        let mut sections: Vec<(&str, &Map<String, Value>)> = Vec::new();
        for (key, val) in res_map {
            if HIDDEN_KEYS.contains(&key.as_str())
                || DETAIL_TABLES.iter().any(|(k, _)| *k == key.as_str())
            {
                continue;
            }
            match val {
                Value::Object(inner) if inner.len() > 1 => sections.push((key.as_str(), inner)),
                _ => {
                    scalars.insert(key.clone(), val.clone());
                }
            }
        }

        if !scalars.is_empty() {
            print_flat_object(&scalars);
        }
        for (name, inner) in sections {
            println!("\n{}:", title(name));
            print_flat_object(inner);
        }
        for (key, heading) in DETAIL_TABLES {
            if let Some(Value::Array(rows)) = res_map.get(key) {
                if !rows.is_empty() {
                    println!("\n{}:", heading);
                    print_array_table(rows);
                }
            }
        }
    } else {
        print_flat_object(envelope);
    }

    // Print warnings if any
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    // Print methodology
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        // Simple array of values
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn title(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        // Tagged values such as {"years": "1.36"}
        Value::Object(map) if map.len() == 1 => map.values().map(format_value).collect(),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged_years_render_as_number() {
        assert_eq!(format_value(&json!({"years": "1.36"})), "1.36");
        assert_eq!(format_value(&json!("infinite")), "infinite");
        assert_eq!(format_value(&Value::Null), "");
    }

    #[test]
    fn test_title_from_key() {
        assert_eq!(title("summary"), "Summary");
        assert_eq!(title("coercion_failures"), "Coercion failures");
    }
}
