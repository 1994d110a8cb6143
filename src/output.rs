//! Output formatting for API responses.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

/// Renders `value` as pretty-printed JSON.
pub fn to_pretty_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes `value` to stdout as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    let rendered = to_pretty_json(value)?;
    debug!(bytes = rendered.len(), "Printing response");
    println!("{rendered}");
    Ok(())
}
