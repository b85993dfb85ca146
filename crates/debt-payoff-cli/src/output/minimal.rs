use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Looks for the headline savings figures first, then falls back to the
/// first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "interest_saved",
        "months_saved",
        "total_interest",
        "total_duration",
    ];

    if let Value::Object(map) = result_obj {
        let found: Vec<String> = priority_keys
            .iter()
            .filter_map(|key| map.get(*key).map(|v| (key, v)))
            .filter(|(_, v)| !v.is_null())
            .map(|(key, v)| format!("{}={}", key, format_minimal(v)))
            .collect();
        if !found.is_empty() {
            println!("{}", found.join(" "));
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    // Compare rows: one line per strategy
    if let Value::Array(rows) = result_obj {
        for row in rows {
            let strategy = row.get("strategy").map(format_minimal).unwrap_or_default();
            let interest = row.get("total_interest").map(format_minimal).unwrap_or_default();
            let months = row.get("total_duration").map(format_minimal).unwrap_or_default();
            println!("{strategy} {interest} {months}");
        }
        return;
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
