use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse YAML{}: {source}", located(.path))]
    Parse {
        path: Option<PathBuf>,
        source: serde_yaml::Error,
    },

    #[error("document root is not a mapping{}", located(.path))]
    NotAMapping { path: Option<PathBuf> },

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("failed to deserialize value at '{path}': {source}")]
    Deserialize {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("value at '{0}' is not a section")]
    NotASection(String),

    #[error("serialized object at '{0}' has no '==' type key")]
    MissingTypeKey(String),

    #[error("mapping has no '==' type key")]
    UntaggedMapping,

    #[error("no reconstruction registered for alias '{0}'")]
    UnknownAlias(String),

    #[error("object at '{path}' is not a '{expected}'")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },
}

fn located(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in '{}'", p.display()))
        .unwrap_or_default()
}

impl DocumentError {
    pub(crate) fn with_file(self, file: &std::path::Path) -> Self {
        match self {
            DocumentError::Parse { path: None, source } => DocumentError::Parse {
                path: Some(file.to_path_buf()),
                source,
            },
            DocumentError::NotAMapping { path: None } => DocumentError::NotAMapping {
                path: Some(file.to_path_buf()),
            },
            other => other,
        }
    }
}
