use std::path::PathBuf;

/// Broad failure classes, used by callers to decide how to report an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing required schema or an unusable request. Nothing partial was produced.
    Configuration,
    /// A file or directory that a stage needs does not exist.
    NotFound,
    /// Read or write failure.
    Io,
    /// A persisted collection could not be decoded.
    Parse,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("metadata file {} is missing the required `{column}` column", .path.display())]
    MissingColumn { column: &'static str, path: PathBuf },

    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("no image folder found (looked in: {}); pass --images <dir>", .searched.join(", "))]
    NoImageDirectory { searched: Vec<String> },

    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed collection {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no search criteria given")]
    EmptyQuery,

    #[error("tag search needs at least one tag")]
    EmptyTagQuery,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingColumn { .. } | Error::EmptyQuery | Error::EmptyTagQuery => {
                ErrorKind::Configuration
            }
            Error::NotFound(_) | Error::NotADirectory(_) | Error::NoImageDirectory { .. } => {
                ErrorKind::NotFound
            }
            Error::Io(_)
            | Error::Csv(_)
            | Error::ReadFailed { .. }
            | Error::WriteFailed { .. } => ErrorKind::Io,
            Error::Json(_) | Error::Parse { .. } => ErrorKind::Parse,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
