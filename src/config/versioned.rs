//! The versioned configuration controller.
//!
//! On every [`VersionedConfig::initialize`] the controller decides whether to
//! create the file, load it as is, or load it and re-apply the host's
//! defaults:
//!
//! ```text
//! file missing -> create file -> load (empty) -> apply defaults -> write version -> save
//! file exists  -> load -> version matches?  yes: done
//!                                           no:  apply defaults -> write version -> save
//! ```
//!
//! Persistence is best effort. Failures to create, read or write the file
//! are logged and never abort the call; the in-memory document stays usable.

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, debug_span, info, warn, Span};

use super::{ConfigError, DefaultConfig};
use crate::access::{ConfigAccess, ConfigSerializable, SerializationRegistry};
use crate::document::{Document, DocumentError};

/// Reserved top-level key recording the version that last applied defaults.
pub const VERSION_KEY: &str = "version";

const EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// A YAML configuration file with versioned defaults.
///
/// ## Example
///
/// ```no_run
/// use std::collections::BTreeMap;
/// use serde_yaml::Mapping;
/// use vconf::{ConfigAccess, DefaultConfig, VersionedConfig};
///
/// struct Defaults;
///
/// impl DefaultConfig for Defaults {
///     fn defaults(&self) -> Mapping {
///         let mut map = Mapping::new();
///         map.insert("greeting".into(), "hello".into());
///         map
///     }
///
///     fn default_comments(&self) -> BTreeMap<String, Vec<String>> {
///         BTreeMap::new()
///     }
/// }
///
/// let mut config = VersionedConfig::new("1.0", "config/app.yml", Defaults)?;
/// config.initialize();
///
/// let greeting = config.get_string("greeting");
/// config.set("greeting", "hi");
/// config.save();
/// # Ok::<(), vconf::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct VersionedConfig<D> {
    version: String,
    file: PathBuf,
    defaults: D,
    document: Document,
    registry: SerializationRegistry,
    span: Span,
}

impl<D: DefaultConfig> VersionedConfig<D> {
    /// Creates a handle for `file` declaring `version`.
    ///
    /// Nothing is read or written until [`initialize`](Self::initialize) or
    /// [`load`](Self::load) is called. Fails if the version is empty or the
    /// file does not have a `.yml`/`.yaml` extension.
    pub fn new(
        version: impl Into<String>,
        file: impl AsRef<Path>,
        defaults: D,
    ) -> Result<Self, ConfigError> {
        let version = version.into();
        if version.is_empty() {
            return Err(ConfigError::EmptyVersion);
        }

        let file = file.as_ref().to_path_buf();
        let recognized = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| EXTENSIONS.contains(&ext));
        if !recognized {
            return Err(ConfigError::InvalidExtension(file));
        }

        let span = debug_span!("config", file = %file.display());
        Ok(Self {
            version,
            file,
            defaults,
            document: Document::new(),
            registry: SerializationRegistry::new(),
            span,
        })
    }

    /// Runs every controller operation inside `span` instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn defaults_provider(&self) -> &D {
        &self.defaults
    }

    /// Loads the file, creating it or re-applying defaults as its version
    /// requires.
    ///
    /// Must be called before relying on any accessor. Calling it again
    /// reloads the file, discarding unsaved changes; a file whose version
    /// matches is loaded untouched.
    pub fn initialize(&mut self) {
        let span = self.span.clone();
        let _guard = span.enter();

        if self.file.exists() {
            self.load();
            if self.check_version() {
                debug!(
                    event = "config.initialize.up_to_date",
                    version = %self.version
                );
                return;
            }

            info!(
                event = "config.initialize.upgrade",
                from = self.stored_version().as_deref().unwrap_or("none"),
                to = %self.version,
                "Configuration version changed, applying defaults"
            );
        } else {
            self.create_file();
            self.load();
            info!(
                event = "config.initialize.created",
                version = %self.version,
                "Configuration file created with defaults"
            );
        }

        self.apply_defaults();
        self.save();
    }

    /// Layers the host's defaults onto the current document and stamps the
    /// declared version.
    ///
    /// Section-shaped defaults replace the section in the document wholesale,
    /// so user edits inside a defaulted section do not survive a version change.
    /// Scalar defaults are fallbacks and never overwrite a set value.
    fn apply_defaults(&mut self) {
        let defaults = self.defaults.defaults();
        for (key, value) in &defaults {
            let Some(path) = key.as_str() else {
                warn!(
                    event = "config.defaults.invalid_key",
                    key = ?key,
                    "Default keyed by a non-string path ignored"
                );
                continue;
            };
            match value {
                Value::Mapping(section) => {
                    self.document.create_section_with(path, section);
                }
                other => self.document.add_default(path, other.clone()),
            }
        }

        for (path, lines) in self.defaults.default_comments() {
            self.document.set_comments(&path, lines);
        }

        self.document.set(VERSION_KEY, self.version.as_str());
    }

    fn create_file(&self) {
        if let Some(parent) = self.file.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(
                    event = "config.file.create_dir_failed",
                    path = %parent.display(),
                    error = %e,
                    "The configuration directory could not be created"
                );
                return;
            }
        }

        let created = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.file);
        match created {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => warn!(
                event = "config.file.create_failed",
                path = %self.file.display(),
                error = %e,
                "The configuration file could not be created"
            ),
        }
    }

    /// Replaces the in-memory document with the configured file's contents.
    ///
    /// Defaults are not applied. A missing or malformed file yields an empty
    /// document.
    pub fn load(&mut self) -> &Document {
        let file = self.file.clone();
        self.load_from(file)
    }

    /// Replaces the in-memory document with the contents of `path`.
    pub fn load_from(&mut self, path: impl AsRef<Path>) -> &Document {
        let span = self.span.clone();
        let _guard = span.enter();

        let path = path.as_ref();
        let document = match self.try_load_from(path) {
            Ok(document) => document,
            Err(e) if e.is_not_found() => {
                debug!(
                    event = "config.load.missing",
                    path = %path.display()
                );
                Document::new()
            }
            Err(e) => {
                warn!(
                    event = "config.load.failed",
                    path = %path.display(),
                    error = %e,
                    "The configuration could not be loaded, using an empty document"
                );
                Document::new()
            }
        };
        self.install(document)
    }

    /// Reads `path` without touching the in-memory document.
    pub fn try_load_from(&self, path: impl AsRef<Path>) -> Result<Document, DocumentError> {
        Document::load_file(path)
    }

    fn install(&mut self, mut document: Document) -> &Document {
        document.options_mut().copy_defaults = true;
        self.document = document;
        &self.document
    }

    /// Writes the in-memory document to the configured file.
    pub fn save(&self) {
        self.save_to(&self.file);
    }

    /// Writes the in-memory document to `path`, logging any failure.
    pub fn save_to(&self, path: impl AsRef<Path>) {
        let _guard = self.span.enter();
        let path = path.as_ref();
        if let Err(e) = self.try_save_to(path) {
            warn!(
                event = "config.save.failed",
                path = %path.display(),
                error = %e,
                "The configuration could not be saved"
            );
        }
    }

    /// Writes the in-memory document to `path`, reporting failure.
    pub fn try_save_to(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        self.document.save_file(path)
    }

    /// Whether the stored version marker equals the declared version.
    ///
    /// An absent marker never matches.
    pub fn check_version(&self) -> bool {
        self.stored_version().is_some_and(|stored| stored == self.version)
    }

    /// The version marker as stored in the document.
    pub fn stored_version(&self) -> Option<String> {
        self.document.get_string(VERSION_KEY)
    }

    /// The current in-memory document.
    pub fn configuration(&self) -> &Document {
        &self.document
    }

    pub fn configuration_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn registry(&self) -> &SerializationRegistry {
        &self.registry
    }

    /// The registry used by [`get_serializable`](Self::get_serializable).
    pub fn registry_mut(&mut self) -> &mut SerializationRegistry {
        &mut self.registry
    }

    /// Rebuilds the tagged object at `path` through the registry.
    ///
    /// `None` when absent or when the stored object cannot be rebuilt as a `T`.
    pub fn get_serializable<T: ConfigSerializable>(&self, path: &str) -> Option<T> {
        match self.registry.get::<T>(&self.document, path) {
            Ok(value) => value,
            Err(e) => {
                debug!(
                    event = "config.serializable.rejected",
                    path,
                    error = %e
                );
                None
            }
        }
    }

    pub fn get_serializable_or<T: ConfigSerializable>(&self, path: &str, default: T) -> T {
        self.get_serializable(path).unwrap_or(default)
    }
}

impl<D> ConfigAccess for VersionedConfig<D> {
    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }
}
