use serde_json::Value;
use std::io;

use super::{result_of, scalar};

/// Write the result as `field,value` rows to stdout.
///
/// Nested objects and arrays are flattened into dotted paths
/// (`line_items.0.monthly_payment`, `source.kind`) so an offer exports as a
/// single two-column sheet.
pub fn print_csv(value: &Value) {
    let mut rows = Vec::new();
    flatten("", result_of(value), &mut rows);

    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let _ = wtr.write_record(["field", "value"]);
    for (field, val) in rows {
        let _ = wtr.write_record([field.as_str(), val.as_str()]);
    }
    let _ = wtr.flush();
}

fn flatten(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten(&join(key), val, rows);
            }
        }
        Value::Array(arr) => {
            for (i, val) in arr.iter().enumerate() {
                flatten(&join(&i.to_string()), val, rows);
            }
        }
        _ => rows.push((prefix.to_string(), scalar(value))),
    }
}
