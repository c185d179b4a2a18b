use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, result_of};

/// Format output as tables using the tabled crate. Nested objects (a loan
/// snapshot, a transition record) get their own field/value table; arrays of
/// objects (installments) become row tables.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    match result {
        Value::Object(map) => print_object(None, map),
        Value::Array(rows) => print_rows(None, rows),
        other => println!("{}", cell(other)),
    }

    if let Some(envelope) = value.as_object() {
        print_footer(envelope);
    }
}

fn print_object(title: Option<&str>, map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);

    let mut nested: Vec<(&str, &Value)> = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(_) => nested.push((key.as_str(), val)),
            Value::Array(items) if items.iter().any(Value::is_object) => {
                nested.push((key.as_str(), val))
            }
            _ => builder.push_record([key.as_str(), &cell(val)]),
        }
    }

    if let Some(t) = title {
        println!("\n{}:", t);
    }
    println!("{}", Table::from(builder));

    for (key, val) in nested {
        match val {
            Value::Object(inner) => print_object(Some(key), inner),
            Value::Array(rows) => print_rows(Some(key), rows),
            _ => {}
        }
    }
}

fn print_rows(title: Option<&str>, rows: &[Value]) {
    if let Some(t) = title {
        println!("\n{}:", t);
    }
    let Some(Value::Object(first)) = rows.first() else {
        println!("(empty)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
