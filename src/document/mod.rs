//! Hierarchical YAML document with dotted-path addressing.
//!
//! A [`Document`] keeps two trees: the explicit values read from or written
//! to the file, and a tree of fallback defaults consulted only where no
//! explicit value exists. Comments are kept per path alongside both.

mod error;
mod file;
pub(crate) mod path;
mod yaml;

use std::borrow::Cow;
use std::path::Path;

use serde_yaml::{Mapping, Value};

pub use error::DocumentError;
use yaml::{CommentMap, RenderContext};

/// Formatting and serialization options of a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Write fallback defaults to the file along with explicit values.
    pub copy_defaults: bool,
    /// Spaces per nesting level when rendering.
    pub indent: usize,
    /// Comment lines written at the top of the file.
    pub header: Vec<String>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            copy_defaults: false,
            indent: 2,
            header: Vec::new(),
        }
    }
}

/// An in-memory YAML document.
///
/// ## Example
///
/// ```
/// use vconf::Document;
///
/// let mut doc = Document::parse("server:\n  port: 8080\n")?;
/// doc.add_default("server.host", "localhost");
///
/// assert_eq!(doc.get("server.port").and_then(|v| v.as_u64()), Some(8080));
/// assert_eq!(doc.get("server.host").and_then(|v| v.as_str()), Some("localhost"));
/// assert!(!doc.contains_explicit("server.host"));
/// # Ok::<(), vconf::DocumentError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    values: Mapping,
    defaults: Mapping,
    comments: CommentMap,
    inline_comments: CommentMap,
    options: DocumentOptions,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing mapping as the document's explicit values.
    pub fn from_mapping(values: Mapping) -> Self {
        Self {
            values: path::normalize_keys(values),
            ..Self::default()
        }
    }

    /// Parses YAML text, keeping its comments.
    ///
    /// Empty or comment-only text yields an empty document.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let parsed = yaml::parse(text)?;
        Ok(Self {
            values: parsed.values,
            defaults: Mapping::new(),
            comments: parsed.comments,
            inline_comments: parsed.inline_comments,
            options: DocumentOptions {
                header: parsed.header,
                ..DocumentOptions::default()
            },
        })
    }

    /// Reads and parses a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        file::read_document(path.as_ref())
    }

    /// Writes the document to a file, creating missing parent directories.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        file::write_document(self, path.as_ref())
    }

    /// Renders the document as YAML text with its comments.
    pub fn to_yaml_string(&self) -> Result<String, DocumentError> {
        let values = self.effective();
        yaml::render(
            &values,
            &RenderContext {
                header: &self.options.header,
                comments: &self.comments,
                inline_comments: &self.inline_comments,
                indent: self.options.indent,
            },
        )
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut DocumentOptions {
        &mut self.options
    }

    /// The explicit values, without defaults.
    pub fn root(&self) -> &Mapping {
        &self.values
    }

    /// The values as they would be written to disk.
    ///
    /// With `copy_defaults`, defaults fill in every path that has no explicit
    /// value; explicit values win and default-only keys come first.
    pub fn effective(&self) -> Cow<'_, Mapping> {
        if !self.options.copy_defaults || self.defaults.is_empty() {
            return Cow::Borrowed(&self.values);
        }
        let mut merged = self.defaults.clone();
        path::deep_merge(&mut merged, &self.values);
        Cow::Owned(merged)
    }

    /// The value at `path`, falling back to the default for that path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.explicit(path).or_else(|| self.default_value(path))
    }

    /// The explicitly set value at `path`, ignoring defaults.
    pub fn explicit(&self, path: &str) -> Option<&Value> {
        path::lookup(&self.values, path)
    }

    /// The default registered for `path`, if any.
    pub fn default_value(&self, path: &str) -> Option<&Value> {
        path::lookup(&self.defaults, path)
    }

    /// Sets an explicit value, creating intermediate sections.
    ///
    /// An empty path addresses nothing and is ignored.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        if path.is_empty() {
            return;
        }
        let value = match value.into() {
            Value::Mapping(map) => Value::Mapping(path::normalize_keys(map)),
            other => other,
        };
        path::insert(&mut self.values, path, value);
    }

    /// Removes the explicit value at `path`. Defaults are untouched.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        path::remove(&mut self.values, path)
    }

    /// Replaces whatever is at `path` with an empty section.
    pub fn create_section(&mut self, path: &str) -> &mut Mapping {
        path::replace_section(&mut self.values, path)
    }

    /// Replaces whatever is at `path` with a section holding `values`.
    ///
    /// Nested mappings become nested sections. Keys are dotted sub-paths, so
    /// `{"a.b": 1}` creates section `a` holding `b`.
    pub fn create_section_with(&mut self, path: &str, values: &Mapping) -> &mut Mapping {
        let section = path::replace_section(&mut self.values, path);
        fill_section(section, values);
        section
    }

    /// Whether `path` has an explicit value or a default.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Whether `path` has an explicit value.
    pub fn contains_explicit(&self, path: &str) -> bool {
        self.explicit(path).is_some()
    }

    /// Whether `path` counts as set: explicitly, or through a default when
    /// defaults are copied to disk.
    pub fn is_set(&self, path: &str) -> bool {
        if self.options.copy_defaults {
            self.contains(path)
        } else {
            self.contains_explicit(path)
        }
    }

    /// Paths of all keys, descending into sections when `deep`.
    pub fn keys(&self, deep: bool) -> Vec<String> {
        let mut keys = Vec::new();
        path::collect_keys(&self.effective(), "", deep, &mut keys);
        keys
    }

    /// Every path mapped to its value, descending into sections when `deep`.
    pub fn values(&self, deep: bool) -> Mapping {
        let mut values = Mapping::new();
        path::collect_values(&self.effective(), "", deep, &mut values);
        values
    }

    /// Registers a fallback value for `path`. Explicit values are untouched.
    pub fn add_default(&mut self, path: &str, value: impl Into<Value>) {
        if path.is_empty() {
            return;
        }
        path::insert(&mut self.defaults, path, value.into());
    }

    /// Registers every entry of `defaults` as a fallback, keyed by dotted path.
    pub fn add_defaults(&mut self, defaults: &Mapping) {
        for (key, value) in defaults {
            if let Some(path) = path::key_string(key) {
                self.add_default(&path, value.clone());
            }
        }
    }

    /// The tree of fallback defaults.
    pub fn defaults(&self) -> &Mapping {
        &self.defaults
    }

    /// Comment lines written above `path`.
    pub fn comments(&self, path: &str) -> Option<&[String]> {
        self.comments.get(path).map(Vec::as_slice)
    }

    /// Replaces the comment lines above `path`. An empty list clears them.
    pub fn set_comments(&mut self, path: &str, lines: Vec<String>) {
        set_lines(&mut self.comments, path, lines);
    }

    /// Comments written after the value at `path`.
    pub fn inline_comments(&self, path: &str) -> Option<&[String]> {
        self.inline_comments.get(path).map(Vec::as_slice)
    }

    /// Replaces the inline comments of `path`. An empty list clears them.
    pub fn set_inline_comments(&mut self, path: &str, lines: Vec<String>) {
        set_lines(&mut self.inline_comments, path, lines);
    }
}

fn fill_section(section: &mut Mapping, values: &Mapping) {
    for (key, value) in values {
        let Some(key) = path::key_string(key) else {
            continue;
        };
        match value {
            Value::Mapping(nested) => {
                let child = path::replace_section(section, &key);
                fill_section(child, nested);
            }
            other => path::insert(section, &key, other.clone()),
        }
    }
}

fn set_lines(map: &mut CommentMap, path: &str, lines: Vec<String>) {
    if lines.is_empty() {
        map.remove(path);
    } else {
        map.insert(path.to_string(), lines);
    }
}
