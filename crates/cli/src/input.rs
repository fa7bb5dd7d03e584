//! Batch input files.

use anyhow::{Context, Result};
use std::path::Path;

/// Read the texts of a batch.
///
/// `.json` files hold an array of strings; anything else is read as one
/// text per non-empty line.
pub fn read_texts(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Expected a JSON array of strings in {}", path.display()))
    } else {
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(String::from)
            .collect())
    }
}
