/// Persistence codec: typed JSON documents on disk.
///
/// Every schema in `document` goes through these two functions, so the
/// on-disk format (pretty-printed JSON via serde_json) is decided here only.

use std::io;
use std::path::{Path, PathBuf};

use derive_more::{Display, Error};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Display, Error)]
pub enum DocumentError {
    #[display("document not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[display("malformed document {}: {source}", path.display())]
    Format { path: PathBuf, source: serde_json::Error },

    #[display("could not access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl DocumentError {
    pub fn path(&self) -> &Path {
        match self {
            DocumentError::NotFound { path }
            | DocumentError::Format { path, .. }
            | DocumentError::Io { path, .. } => path,
        }
    }

    fn from_io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            DocumentError::NotFound { path: path.to_path_buf() }
        } else {
            DocumentError::Io { path: path.to_path_buf(), source: err }
        }
    }
}

/// Read and parse `path` into `T`.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| DocumentError::from_io(path, e))?;
    serde_json::from_str(&text)
        .map_err(|e| DocumentError::Format { path: path.to_path_buf(), source: e })
}

/// Serialize `doc` and write it to `path`, replacing any existing file.
pub fn write_document<T: Serialize>(doc: &T, path: &Path) -> Result<(), DocumentError> {
    let text = serde_json::to_string_pretty(doc)
        .map_err(|e| DocumentError::Format { path: path.to_path_buf(), source: e })?;
    std::fs::write(path, text)
        .map_err(|e| DocumentError::from_io(path, e))
}
