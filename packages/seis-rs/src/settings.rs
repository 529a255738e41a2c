//! Layered JSON settings files
//!
//! A settings file may name other files under `"include"`. Included files are
//! merged in order and the including file is merged last, so its values win.
//! Relative include paths resolve against the including file's directory.

use crate::error::{Result, SeisError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const INCLUDE_KEY: &str = "include";

/// Deep merge: objects merge key by key, anything else is replaced by `overlay`
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(a), Value::Object(b)) => {
            let mut merged: Map<String, Value> = a.clone();
            for (key, value) in b {
                let entry = match a.get(key) {
                    Some(existing) => merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

fn read_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(SeisError::FileNotFound(path.display().to_string()));
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn include_paths(local: &Value, base_dir: &Path) -> Result<Vec<PathBuf>> {
    let Some(include) = local.get(INCLUDE_KEY) else {
        return Ok(Vec::new());
    };
    let entries = include.as_array().ok_or_else(|| {
        SeisError::InvalidParameter("\"include\" must be a list of file names".to_string())
    })?;
    entries
        .iter()
        .map(|entry| {
            let name = entry.as_str().ok_or_else(|| {
                SeisError::InvalidParameter(format!("include entry {} is not a string", entry))
            })?;
            let path = Path::new(name);
            Ok(if path.is_relative() {
                base_dir.join(path)
            } else {
                path.to_path_buf()
            })
        })
        .collect()
}

/// Read a settings file and merge in its includes (one level deep)
pub fn gather(path: &Path) -> Result<Value> {
    let local = read_json(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let includes = include_paths(&local, base_dir)?;
    if includes.is_empty() {
        return Ok(local);
    }

    let mut data = Value::Object(Map::new());
    for include in &includes {
        log::debug!("Merging settings from {}", include.display());
        data = merge(&data, &read_json(include)?);
    }
    Ok(merge(&data, &local))
}

/// Gather a settings file and deserialize the section under `key` (or the whole document)
pub fn load<T: DeserializeOwned>(path: &Path, key: Option<&str>) -> Result<T> {
    let data = gather(path)?;
    let section = match key {
        Some(k) => data.get(k).cloned().unwrap_or(Value::Object(Map::new())),
        None => data,
    };
    Ok(serde_json::from_value(section)?)
}
