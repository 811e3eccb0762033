use serde_json::Value;

use super::{result_of, scalar};

/// Fields that answer each command, most specific first.
const ANSWER_KEYS: [&str; 5] = [
    "margin_difference",
    "commission_amount",
    "financed_amount",
    "coefficient",
    "clean",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Value::Object(map) = result {
        if let Some(val) = ANSWER_KEYS
            .iter()
            .filter_map(|k| map.get(*k))
            .find(|v| !v.is_null())
        {
            println!("{}", scalar(val));
            return;
        }

        // Status changes answer with the move itself
        if let Some(Value::Object(change)) = map.get("change") {
            let from = change.get("from").map(scalar).unwrap_or_default();
            let to = change.get("to").map(scalar).unwrap_or_default();
            println!("{from} -> {to}");
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar(val));
            return;
        }
    }

    println!("{}", scalar(result));
}
