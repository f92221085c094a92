use serde::de::DeserializeOwned;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Read an input file as UTF-8 text.
pub fn read_text(path: &str) -> Result<String, Box<dyn Error>> {
    let resolved = resolve_path(path)?;
    let text = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
    Ok(text)
}

/// Read a JSON input file into a typed request.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn Error>> {
    let text = read_text(path)?;
    let value = serde_json::from_str(&text).map_err(|e| format!("Failed to parse '{path}': {e}"))?;
    Ok(value)
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn Error>> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("File not found: {}", p.display()).into());
    }
    if !p.is_file() {
        return Err(format!("Not a file: {}", p.display()).into());
    }
    Ok(p.to_path_buf())
}
