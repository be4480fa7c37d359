use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by [`crate::ingestion::Ingestor`] read calls.
///
/// Row-level defects (wrong length, wrong type) are not errors; they are recorded as
/// [`crate::types::ErrorRecord`]s and the read continues.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The source could not be opened or parsed at all.
    ///
    /// Missing files, permission problems, undecodable text and corrupt workbooks all surface as
    /// this one kind; the underlying cause is attached.
    #[error("error while importing '{}': {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: SourceError,
    },

    /// The [`crate::ingestion::ReaderConfig`] cannot be applied (bad dialect character, unknown
    /// encoding label, malformed JSON config bundle).
    #[error("invalid reader configuration: {message}")]
    InvalidConfig { message: String },
}

impl IngestionError {
    /// Returns `true` if this is a [`IngestionError::SourceUnreadable`] failure.
    pub fn is_source_unreadable(&self) -> bool {
        matches!(self, Self::SourceUnreadable { .. })
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: impl Into<SourceError>) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Underlying cause of an [`IngestionError::SourceUnreadable`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited text could not be parsed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook could not be opened or its sheet could not be read.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The file bytes are not valid in the configured encoding.
    #[error("input is not valid {encoding}")]
    Decode { encoding: &'static str },
}
