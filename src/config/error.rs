use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when a [`VersionedConfig`](super::VersionedConfig) is constructed.
///
/// Runtime I/O failures are never reported through this type; they are
/// logged and the in-memory document stays usable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("not a configuration file (expected a .yml or .yaml extension): {0}")]
    InvalidExtension(PathBuf),

    #[error("configuration version must not be empty")]
    EmptyVersion,
}
