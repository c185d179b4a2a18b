pub mod credit;
pub mod dashboard;
pub mod lifecycle;
pub mod loan;

use serde::de::DeserializeOwned;

use crate::input;

/// Resolve a command's structured input: `--input` file first, then piped
/// stdin. `None` means the caller should fall back to individual flags.
pub fn load_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(input::file::read_structured(path)?));
    }
    match input::stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}
