use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};

use crate::error::{FatalError, FatalKind};

/// The JSON configuration document, its on-disk location, and dirty state.
///
/// Paths into the tree are ordered key/index segments, resolved lazily
/// against the live value: a stale path simply fails to resolve.
pub struct Document {
    path: PathBuf,
    data: Value,
    dirty: bool,
}

impl Document {
    /// Built-in defaults used when no config file exists on disk.
    pub fn default_data() -> Value {
        json!({
            "enable-colors": true,
            "indent-step": 4,
            "disable-config-editor": false,
        })
    }

    /// Load the document from `path`. A missing file falls back to the
    /// built-in defaults; unreadable or malformed content is fatal.
    pub fn load(path: PathBuf) -> Result<Self, FatalError> {
        let data = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| {
                FatalError::new(
                    FatalKind::ConfigDecode,
                    "config file could not be read",
                    e.to_string(),
                )
            })?;
            serde_json::from_str(&text).map_err(|e| {
                FatalError::new(
                    FatalKind::ConfigDecode,
                    "config file decoding failed",
                    e.to_string(),
                )
            })?
        } else {
            Self::default_data()
        };

        Ok(Self {
            path,
            data,
            dirty: false,
        })
    }

    /// Re-read the document from disk, discarding unsaved changes.
    pub fn revert(&mut self) -> Result<(), FatalError> {
        let fresh = Self::load(self.path.clone())?;
        self.data = fresh.data;
        self.dirty = false;
        Ok(())
    }

    /// Persist the document and clear the dirty flag.
    pub fn save(&mut self) -> Result<(), FatalError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                FatalError::new(
                    FatalKind::ConfigSave,
                    "config directory could not be created",
                    e.to_string(),
                )
            })?;
        }
        let text = serde_json::to_string_pretty(&self.data).map_err(|e| {
            FatalError::new(
                FatalKind::ConfigSave,
                "config serialization failed",
                e.to_string(),
            )
        })?;
        fs::write(&self.path, text).map_err(|e| {
            FatalError::new(
                FatalKind::ConfigSave,
                "config file could not be written",
                e.to_string(),
            )
        })?;
        self.dirty = false;
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Value at `path`, or None when the path does not resolve. Array
    /// segments must be in-range integers; anything else aborts resolution.
    pub fn get(&self, path: &[String]) -> Option<&Value> {
        let mut current = &self.data;
        for segment in path {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    fn get_mut(&mut self, path: &[String]) -> Option<&mut Value> {
        let mut current = &mut self.data;
        for segment in path {
            current = match current {
                Value::Object(map) => map.get_mut(segment)?,
                Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Set the value at `path`, inferring its type from the raw text. The
    /// final key of an object path is created when missing.
    pub fn set(&mut self, path: &[String], raw: &str) -> Result<String, String> {
        let Some((last, parents)) = path.split_last() else {
            return Err("cannot modify the value of root".to_string());
        };

        let value = convert_value(raw);
        let rendered = render(&value);
        let kind = type_name(&value);

        let message = match self.get_mut(parents) {
            None => return Err(format!("invalid path: {}", path.join("/"))),
            Some(Value::Object(map)) => {
                map.insert(last.clone(), value);
                format!("key '{last}' set to {rendered} ({kind})")
            }
            Some(Value::Array(items)) => {
                let index: usize = last
                    .parse()
                    .map_err(|_| format!("index '{last}' must be a valid integer"))?;
                if index >= items.len() {
                    return Err(format!("index '{index}' is out of range"));
                }
                items[index] = value;
                format!("index '{index}' set to {rendered} ({kind})")
            }
            Some(_) => return Err("cannot set a value at this position".to_string()),
        };

        self.dirty = true;
        Ok(message)
    }

    /// Delete the key or index at `path`. Failure leaves the document and
    /// the dirty flag untouched.
    pub fn delete(&mut self, path: &[String]) -> Result<String, String> {
        let Some((last, parents)) = path.split_last() else {
            return Err("cannot delete the root".to_string());
        };

        let message = match self.get_mut(parents) {
            None => return Err(format!("path not found: {}", path.join("/"))),
            Some(Value::Object(map)) => {
                if map.remove(last).is_none() {
                    return Err(format!("path not found: {}", path.join("/")));
                }
                format!("key '{last}' has been deleted")
            }
            Some(Value::Array(items)) => {
                let index: usize = last
                    .parse()
                    .map_err(|_| format!("index '{last}' must be a valid integer"))?;
                if index >= items.len() {
                    return Err(format!("index '{index}' is out of range"));
                }
                items.remove(index);
                format!("index '{index}' has been deleted")
            }
            Some(_) => return Err("cannot delete from this value type".to_string()),
        };

        self.dirty = true;
        Ok(message)
    }

    /// Append an element to the array at `path`.
    pub fn append(&mut self, path: &[String], raw: &str) -> Result<String, String> {
        let path_display = display_path(path);
        let value = convert_value(raw);
        let rendered = render(&value);
        let kind = type_name(&value);

        match self.get_mut(path) {
            None => return Err(format!("path not found: {path_display}")),
            Some(Value::Array(items)) => items.push(value),
            Some(other) => {
                return Err(format!(
                    "path '{path_display}' does not point to an array ({})",
                    type_name(other)
                ));
            }
        }

        self.dirty = true;
        Ok(format!("new element appended: {rendered} ({kind})"))
    }

    /// Insert an element at `index` into the array at `path`. Valid indices
    /// run from zero through the current length.
    pub fn insert(&mut self, path: &[String], index_raw: &str, raw: &str) -> Result<String, String> {
        let path_display = display_path(path);
        let index: usize = index_raw
            .parse()
            .map_err(|_| format!("index '{index_raw}' must be a valid integer"))?;

        let value = convert_value(raw);
        let rendered = render(&value);
        let kind = type_name(&value);

        match self.get_mut(path) {
            None => return Err(format!("path not found: {path_display}")),
            Some(Value::Array(items)) => {
                if index > items.len() {
                    return Err(format!(
                        "index '{index}' is out of range; valid range: 0 to {}",
                        items.len()
                    ));
                }
                items.insert(index, value);
            }
            Some(other) => {
                return Err(format!(
                    "path '{path_display}' does not point to an array ({})",
                    type_name(other)
                ));
            }
        }

        self.dirty = true;
        Ok(format!(
            "new element inserted at index '{index}': {rendered} ({kind})"
        ))
    }
}

/// Console-facing name of a JSON value's type.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact rendering for status messages.
pub fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn display_path(path: &[String]) -> String {
    format!("/{}", path.join("/"))
}

/// Infer a JSON value from raw console input: quoted strings stay strings,
/// then booleans, null, numbers (a decimal point selects float), embedded
/// JSON for bracket-prefixed input, and finally the raw text itself.
pub fn convert_value(raw: &str) -> Value {
    let raw = raw.trim();

    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Value::String(raw[1..raw.len() - 1].to_string());
    }

    let lowered = raw.to_ascii_lowercase();
    if lowered == "true" || lowered == "false" {
        return Value::Bool(lowered == "true");
    }
    if lowered == "null" || lowered == "none" {
        return Value::Null;
    }

    if raw.contains('.') {
        if let Ok(f) = raw.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    } else if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }

    if raw.starts_with('{') || raw.starts_with('[') {
        if let Ok(value) = serde_json::from_str(raw) {
            return value;
        }
    }

    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(path: &str) -> Vec<String> {
        if path.is_empty() {
            Vec::new()
        } else {
            path.split('.').map(str::to_string).collect()
        }
    }

    fn doc(data: Value) -> Document {
        Document {
            path: std::env::temp_dir().join("rill-doc-test.json"),
            data,
            dirty: false,
        }
    }

    #[test]
    fn convert_infers_primitives() {
        assert_eq!(convert_value("true"), Value::Bool(true));
        assert_eq!(convert_value("False"), Value::Bool(false));
        assert_eq!(convert_value("null"), Value::Null);
        assert_eq!(convert_value("none"), Value::Null);
        assert_eq!(convert_value("42"), json!(42));
        assert_eq!(convert_value("3.5"), json!(3.5));
        assert_eq!(convert_value("[1,2]"), json!([1, 2]));
        assert_eq!(convert_value(r#"{"a": 1}"#), json!({"a": 1}));
        assert_eq!(convert_value("plain"), json!("plain"));
    }

    #[test]
    fn convert_keeps_quoted_strings_verbatim() {
        assert_eq!(convert_value(r#""localhost""#), json!("localhost"));
        assert_eq!(convert_value(r#""true""#), json!("true"));
        assert_eq!(convert_value(r#""3.5""#), json!("3.5"));
    }

    #[test]
    fn set_then_get_round_trips_inference() {
        let mut document = doc(json!({}));
        document.set(&segments("ratio"), "3.5").unwrap();
        document.set(&segments("flag"), "true").unwrap();
        document.set(&segments("items"), "[1,2]").unwrap();

        assert_eq!(document.get(&segments("ratio")), Some(&json!(3.5)));
        assert_eq!(document.get(&segments("flag")), Some(&json!(true)));
        assert_eq!(document.get(&segments("items")), Some(&json!([1, 2])));
        assert!(document.is_dirty());
    }

    #[test]
    fn set_creates_missing_final_key_only() {
        let mut document = doc(json!({"database": {}}));
        document
            .set(&segments("database.host"), r#""localhost""#)
            .unwrap();
        assert_eq!(
            document.get(&segments("database.host")),
            Some(&json!("localhost"))
        );

        // Missing intermediate levels are not created.
        assert!(document.set(&segments("a.b.c"), "1").is_err());
    }

    #[test]
    fn delete_missing_path_leaves_document_and_dirty_flag() {
        let mut document = doc(json!({"keep": 1}));
        assert!(document.delete(&segments("gone")).is_err());
        assert_eq!(document.get(&segments("keep")), Some(&json!(1)));
        assert!(!document.is_dirty());
    }

    #[test]
    fn delete_removes_keys_and_indices() {
        let mut document = doc(json!({"list": [1, 2, 3], "key": true}));
        document.delete(&segments("list.1")).unwrap();
        assert_eq!(document.get(&segments("list")), Some(&json!([1, 3])));

        document.delete(&segments("key")).unwrap();
        assert_eq!(document.get(&segments("key")), None);
        assert!(document.is_dirty());
    }

    #[test]
    fn array_errors_distinguish_range_from_type() {
        let mut document = doc(json!({"list": [1], "scalar": 5}));

        let out_of_range = document.delete(&segments("list.9")).unwrap_err();
        assert!(out_of_range.contains("out of range"));

        let wrong_type = document.append(&segments("scalar"), "1").unwrap_err();
        assert!(wrong_type.contains("does not point to an array"));
        assert!(!document.is_dirty());
    }

    #[test]
    fn append_and_insert_respect_bounds() {
        let mut document = doc(json!({"list": [1, 3]}));
        document.append(&segments("list"), "4").unwrap();
        document.insert(&segments("list"), "1", "2").unwrap();
        assert_eq!(document.get(&segments("list")), Some(&json!([1, 2, 3, 4])));

        assert!(document.insert(&segments("list"), "9", "0").is_err());
        assert!(document.insert(&segments("list"), "x", "0").is_err());
    }

    #[test]
    fn get_rejects_bad_array_indices() {
        let document = doc(json!({"list": [1, 2]}));
        assert_eq!(document.get(&segments("list.first")), None);
        assert_eq!(document.get(&segments("list.7")), None);
        assert_eq!(document.get(&segments("list.0")), Some(&json!(1)));
    }

    #[test]
    fn root_is_protected() {
        let mut document = doc(json!({}));
        assert!(document.set(&[], "1").is_err());
        assert!(document.delete(&[]).is_err());
    }
}
