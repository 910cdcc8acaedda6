//! Store-specific error type wrapping IO and parse errors.

use std::path::PathBuf;

use dashconf_domain::error::DashConfError;

/// Errors originating from the INI file store.
#[derive(Debug, thiserror::Error)]
pub enum IniStoreError {
    /// Reading, writing or renaming a file failed.
    #[error("unable to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file exists but is not valid INI.
    #[error("unable to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ini::ParseError,
    },
}

impl From<IniStoreError> for DashConfError {
    fn from(err: IniStoreError) -> Self {
        Self::Storage(Box::new(err))
    }
}
