use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::scalar;

/// Format output as tables: scalar fields first, then one table per list of
/// records (e.g. offer line items), then warnings and methodology.
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{}", scalar(value));
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => print_object(result),
        Some(other) => println!("{}", scalar(other)),
        None => print_object(envelope),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                println!("  - {}", scalar(w));
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut record_lists = Vec::new();

    for (key, val) in map {
        match val {
            Value::Array(items) if items.iter().any(Value::is_object) => {
                record_lists.push((key, items))
            }
            Value::Array(items) => {
                let joined: Vec<String> = items.iter().map(scalar).collect();
                builder.push_record([key.clone(), joined.join(", ")]);
            }
            _ => builder.push_record([key.clone(), scalar(val)]),
        }
    }
    println!("{}", Table::from(builder));

    for (key, items) in record_lists {
        println!("\n{}:", key);
        print_records(items);
    }
}

fn print_records(items: &[Value]) {
    // Union of keys in first-seen order; optional fields may be absent on
    // some rows.
    let mut headers: Vec<&str> = Vec::new();
    for item in items {
        if let Value::Object(row) = item {
            for key in row.keys() {
                if !headers.contains(&key.as_str()) {
                    headers.push(key);
                }
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(headers.iter().copied());
    for item in items {
        if let Value::Object(row) = item {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| row.get(*h).map(scalar).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}
