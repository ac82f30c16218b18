use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the store, corpus and report layers.
///
/// Batch operations never return these for a single bad document or file;
/// those are logged and counted instead.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("title '{title}' does not split into scholar and tractate")]
    TitleParse { title: String },
    #[error("failed to persist {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, CorpusError>;
