//! Versioned YAML configuration files with typed accessors.
//!
//! A [`VersionedConfig`] owns one YAML [`Document`] and a declared version.
//! On [`initialize`](VersionedConfig::initialize) it creates the file on first
//! run, loads it as is when the stored version matches, and otherwise
//! re-applies the host's [`DefaultConfig`] without clobbering user-set values.
//! Reads and writes go through [`ConfigAccess`].

pub mod access;
pub mod config;
pub mod document;

pub use access::{ConfigAccess, ConfigSerializable, SerializationRegistry};
pub use config::{ConfigError, DefaultConfig, VersionedConfig, VERSION_KEY};
pub use document::{Document, DocumentError, DocumentOptions};
