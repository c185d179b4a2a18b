use serde_json::Value;

use super::{cell, result_of};

/// Headline field per command, in priority order. Loan snapshots nest under
/// `loan`, so those are checked one level down as well.
const PRIORITY_KEYS: [&str; 7] = [
    "daily_payment",
    "available_credit",
    "availableCredit",
    "outstanding_balance",
    "total_scheduled",
    "status",
    "total_amount",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Some(answer) = find_headline(result) {
        println!("{}", cell(answer));
        return;
    }

    match result {
        Value::Object(map) => {
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, cell(val));
            }
        }
        other => println!("{}", cell(other)),
    }
}

fn find_headline(result: &Value) -> Option<&Value> {
    let map = result.as_object()?;
    // The rounded block is what a caller would store or quote.
    let rounded = map.get("rounded").and_then(Value::as_object);
    let loan = map.get("loan").and_then(Value::as_object);

    PRIORITY_KEYS.iter().find_map(|key| {
        rounded
            .and_then(|r| r.get(*key))
            .or_else(|| loan.and_then(|l| l.get(*key)))
            .or_else(|| map.get(*key))
            .filter(|v| !v.is_null())
    })
}
