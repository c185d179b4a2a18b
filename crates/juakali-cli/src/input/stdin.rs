use serde_json::Value;
use std::io::{self, Read};

/// Piped loan, payment or dashboard input for `load_input`, used when no
/// `--input` file is given. JSON is tried first, then YAML.
///
/// `None` when stdin is a terminal or the pipe is empty, so the command
/// falls back to its flags.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut piped = String::new();
    io::stdin().read_to_string(&mut piped)?;
    let body = piped.trim();
    if body.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(body) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => serde_yaml::from_str(body)
            .map(Some)
            .map_err(|_| format!("stdin is neither JSON nor YAML: {json_err}").into()),
    }
}
