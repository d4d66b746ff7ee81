use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reasons a single rename is abandoned. None of these stop the walk.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("source {0} does not exist")]
    SourceMissing(PathBuf),

    #[error("destination {0} already exists")]
    DestinationExists(PathBuf),

    #[error("renaming {from} to {to} failed: {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("refusing to rename {from} to unusable name '{name}'")]
    InvalidTarget { from: PathBuf, name: String },
}

impl RenameError {
    /// Short label used in log fields and the journal.
    pub fn reason(&self) -> &'static str {
        match self {
            RenameError::SourceMissing(_) => "source-missing",
            RenameError::DestinationExists(_) => "destination-exists",
            RenameError::RenameFailed { .. } => "rename-error",
            RenameError::InvalidTarget { .. } => "invalid-target",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("replacement must be a single character, got '{0}'")]
    ReplacementLength(String),

    #[error("replacement character '{0}' is not allowed")]
    ReplacementForbidden(char),

    #[error("replacement character '{0}' is itself in the ugly character set")]
    ReplacementIsUgly(char),

    #[error("ugly character set is empty but the ugly-characters rule is enabled")]
    EmptyUglySet,

    #[error("ugly character set may not contain '{0}'")]
    UglyForbidden(char),

    #[error("both files and directories are disabled; nothing to do")]
    NothingSelected,

    #[error("invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("unable to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}
