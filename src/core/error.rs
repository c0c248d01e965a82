use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Source unavailable: {locator}: {source}")]
    SourceUnavailable {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Duplicate tag: {0}")]
    DuplicateTag(String),

    #[error("Invalid tag {0:?}: tags must be non-empty and must not contain NUL bytes")]
    InvalidTag(String),

    #[error("Invalid magic signature in content header")]
    InvalidMagic,

    #[error("Corrupt content header: {0}")]
    CorruptHeader(String),

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid version: {0} (must be semver with components no larger than 255)")]
    InvalidVersion(String),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
