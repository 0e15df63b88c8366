//! Versioned configuration files backed by a YAML [`Document`](crate::Document).

mod defaults;
mod error;
mod versioned;

pub use defaults::DefaultConfig;
pub use error::ConfigError;
pub use versioned::{VersionedConfig, VERSION_KEY};
