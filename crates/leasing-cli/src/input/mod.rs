pub mod file;

use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Typed input from `--input <file>` or, failing that, piped stdin.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_structured(path);
    }
    match read_piped_stdin()? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Err(format!("--input <file.json> or stdin required for {what}").into()),
    }
}

/// Piped stdin contents, or `None` when stdin is a terminal or empty.
fn read_piped_stdin() -> Result<Option<String>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}
