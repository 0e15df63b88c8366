//! Dotted-path traversal over YAML mappings.
//!
//! A path like `server.http.port` addresses key `port` inside section `http`
//! inside top-level section `server`. Paths never escape or quote the
//! separator; keys containing `.` cannot be addressed.

use serde_yaml::{Mapping, Value};

pub const SEPARATOR: char = '.';

/// Joins a parent path and a child key.
pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{SEPARATOR}{key}")
    }
}

/// Splits a path into its parent path (if any) and its final key.
fn split_leaf(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once(SEPARATOR) {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, path),
    }
}

/// Looks up a dotted path in a mapping.
pub fn lookup<'a>(root: &'a Mapping, path: &str) -> Option<&'a Value> {
    let mut parts = path.split(SEPARATOR);
    let mut current = root.get(parts.next()?)?;

    for part in parts {
        current = current.as_mapping()?.get(part)?;
    }

    Some(current)
}

/// Looks up the section at a dotted path for mutation, without creating it.
fn lookup_section_mut<'a>(root: &'a mut Mapping, path: &str) -> Option<&'a mut Mapping> {
    let mut current = root;
    for part in path.split(SEPARATOR) {
        current = current.get_mut(part)?.as_mapping_mut()?;
    }
    Some(current)
}

/// Returns the child section under `key`, replacing any non-section value.
fn child_section<'a>(map: &'a mut Mapping, key: &str) -> &'a mut Mapping {
    let slot = map
        .entry(Value::String(key.to_string()))
        .or_insert(Value::Null);
    if !slot.is_mapping() {
        *slot = Value::Mapping(Mapping::new());
    }
    match slot {
        Value::Mapping(section) => section,
        _ => unreachable!("slot holds a mapping"),
    }
}

/// Walks to the section at `path`, creating every missing section on the way.
pub fn section_mut<'a>(root: &'a mut Mapping, path: &str) -> &'a mut Mapping {
    path.split(SEPARATOR).fold(root, child_section)
}

/// Sets `value` at `path`, creating intermediate sections as needed.
///
/// Intermediate scalars in the way are replaced by sections. An existing key
/// keeps its position in the mapping.
pub fn insert(root: &mut Mapping, path: &str, value: Value) {
    let (parent, leaf) = split_leaf(path);
    let target = match parent {
        Some(parent) => section_mut(root, parent),
        None => root,
    };
    target.insert(Value::String(leaf.to_string()), value);
}

/// Replaces whatever is at `path` with an empty section and returns it.
pub fn replace_section<'a>(root: &'a mut Mapping, path: &str) -> &'a mut Mapping {
    let (parent, leaf) = split_leaf(path);
    let target = match parent {
        Some(parent) => section_mut(root, parent),
        None => root,
    };
    target.insert(Value::String(leaf.to_string()), Value::Mapping(Mapping::new()));
    child_section(target, leaf)
}

/// Removes the value at `path`, returning it if present.
pub fn remove(root: &mut Mapping, path: &str) -> Option<Value> {
    let (parent, leaf) = split_leaf(path);
    let target = match parent {
        Some(parent) => lookup_section_mut(root, parent)?,
        None => root,
    };
    target.shift_remove(leaf)
}

/// Recursively merges `overlay` into `base`.
///
/// Nested sections are merged key by key; any other value in `overlay`
/// replaces the one in `base`.
pub fn deep_merge(base: &mut Mapping, overlay: &Mapping) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Mapping(base_section)), Value::Mapping(overlay_section)) => {
                deep_merge(base_section, overlay_section);
            }
            (_, value) => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Collects the paths of all keys in `map`, descending into sections when `deep`.
pub fn collect_keys(map: &Mapping, prefix: &str, deep: bool, out: &mut Vec<String>) {
    for (key, value) in map {
        let Some(key) = key_string(key) else {
            continue;
        };
        let path = join(prefix, &key);
        out.push(path.clone());
        if deep {
            if let Value::Mapping(section) = value {
                collect_keys(section, &path, deep, out);
            }
        }
    }
}

/// Collects every path and its value, descending into sections when `deep`.
pub fn collect_values(map: &Mapping, prefix: &str, deep: bool, out: &mut Mapping) {
    for (key, value) in map {
        let Some(key) = key_string(key) else {
            continue;
        };
        let path = join(prefix, &key);
        out.insert(Value::String(path.clone()), value.clone());
        if deep {
            if let Value::Mapping(section) = value {
                collect_values(section, &path, deep, out);
            }
        }
    }
}

/// Renders a mapping key as a path segment. Only scalar keys are addressable.
pub fn key_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Converts scalar keys to strings throughout a mapping so that every key can
/// be addressed by a dotted path.
pub fn normalize_keys(map: Mapping) -> Mapping {
    map.into_iter()
        .map(|(key, value)| {
            let key = match key_string(&key) {
                Some(s) => Value::String(s),
                None => key,
            };
            let value = match value {
                Value::Mapping(section) => Value::Mapping(normalize_keys(section)),
                other => other,
            };
            (key, value)
        })
        .collect()
}
