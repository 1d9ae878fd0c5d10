//! Dotted-path navigation over loosely-typed page state.
//!
//! Page state is a `serde_json::Value` tree. Every structural lookup in the
//! crate goes through [`path`] or [`path_default`], so the rules for
//! traversing that tree live in one place.

use serde_json::Value;
use thiserror::Error;

/// Why a dotted-path lookup failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A mapping did not contain the requested key.
    #[error("key `{segment}` not found while resolving `{path}`")]
    KeyNotFound { path: String, segment: String },

    /// A sequence was shorter than the requested index.
    #[error("index {index} out of range (len {len}) while resolving `{path}`")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    /// The segment does not fit the node: a non-integer segment on a sequence,
    /// or any segment on a scalar.
    #[error("segment `{segment}` does not apply to a {found} while resolving `{path}`")]
    TypeMismatch {
        path: String,
        segment: String,
        found: &'static str,
    },
}

impl PathError {
    /// Lookup errors are the ones a defaulted lookup may swallow.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            PathError::KeyNotFound { .. } | PathError::IndexOutOfRange { .. }
        )
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Resolve `dotted` (for example `contents.tabs.0.tabRenderer`) against `root`.
///
/// Segments index into arrays when the current node is an array and look up
/// keys otherwise.
pub fn path<'a>(dotted: &str, root: &'a Value) -> Result<&'a Value, PathError> {
    let mut node = root;
    for segment in dotted.split('.') {
        node = match node {
            Value::Array(items) => {
                let index: usize = segment.parse().map_err(|_| PathError::TypeMismatch {
                    path: dotted.to_string(),
                    segment: segment.to_string(),
                    found: "sequence",
                })?;
                items.get(index).ok_or_else(|| PathError::IndexOutOfRange {
                    path: dotted.to_string(),
                    index,
                    len: items.len(),
                })?
            }
            Value::Object(map) => map.get(segment).ok_or_else(|| PathError::KeyNotFound {
                path: dotted.to_string(),
                segment: segment.to_string(),
            })?,
            other => {
                return Err(PathError::TypeMismatch {
                    path: dotted.to_string(),
                    segment: segment.to_string(),
                    found: kind(other),
                })
            }
        };
    }
    Ok(node)
}

/// Like [`path`], but a missing key or index yields `default` instead.
///
/// Type mismatches still propagate.
pub fn path_default<'a>(
    dotted: &str,
    root: &'a Value,
    default: &'a Value,
) -> Result<&'a Value, PathError> {
    match path(dotted, root) {
        Ok(value) => Ok(value),
        Err(e) if e.is_lookup() => Ok(default),
        Err(e) => Err(e),
    }
}

/// Resolve `dotted` and require a string at the end of it.
pub fn path_str<'a>(dotted: &str, root: &'a Value) -> Result<&'a str, PathError> {
    let value = path(dotted, root)?;
    value.as_str().ok_or_else(|| PathError::TypeMismatch {
        path: dotted.to_string(),
        segment: dotted.rsplit('.').next().unwrap_or(dotted).to_string(),
        found: kind(value),
    })
}

/// Resolve `dotted` and require a boolean at the end of it.
pub fn path_bool(dotted: &str, root: &Value) -> Result<bool, PathError> {
    let value = path(dotted, root)?;
    value.as_bool().ok_or_else(|| PathError::TypeMismatch {
        path: dotted.to_string(),
        segment: dotted.rsplit('.').next().unwrap_or(dotted).to_string(),
        found: kind(value),
    })
}

/// Resolve `dotted`, treating a missing element as `None`.
pub fn path_opt<'a>(dotted: &str, root: &'a Value) -> Result<Option<&'a Value>, PathError> {
    match path(dotted, root) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_lookup() => Ok(None),
        Err(e) => Err(e),
    }
}
