//! The [`Ingestor`]: one reader configuration plus the results of the most recent read.
//!
//! - [`Ingestor::read_csv`] / [`Ingestor::read_excel`] read one source kind directly.
//! - [`Ingestor::read_path`] infers the source kind from the file extension (unless
//!   [`IngestionOptions::format`] forces one) and reports the outcome to an optional
//!   [`IngestionObserver`].
//!
//! Every read replaces the previous results wholesale. A failed read leaves the ingestor empty.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{ErrorRecord, Schema, Value};

use super::config::ReaderConfig;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::session::Session;
use super::{csv, excel};

/// Supported source kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text.
    Csv,
    /// Spreadsheet/workbook formats.
    Excel,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }

    fn from_path(path: &Path) -> IngestionResult<Self> {
        let ext = path.extension().and_then(|s| s.to_str()).ok_or_else(|| {
            IngestionError::config(format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ))
        })?;

        Self::from_extension(ext).ok_or_else(|| {
            IngestionError::config(format!(
                "cannot infer format from extension '{ext}' for path ({})",
                path.display()
            ))
        })
    }
}

/// Options for [`Ingestor::read_path`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<SourceFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Reads a spreadsheet or delimited text file, infers a schema from its first data row and
/// splits the remaining rows into accepted rows and error records.
///
/// Reads take `&mut self`; callers sharing an ingestor across threads must serialize access
/// themselves (e.g. behind a `Mutex`).
///
/// ```no_run
/// use sheet_ingest::ingestion::{Ingestor, ReaderConfig};
///
/// # fn main() -> Result<(), sheet_ingest::IngestionError> {
/// let mut ingestor = Ingestor::new(ReaderConfig {
///     skip_rows: 2,
///     ..Default::default()
/// });
/// ingestor.read_excel("person_data.xlsx")?;
/// println!("{:?} rows={} errors={}", ingestor.header(), ingestor.rows().len(), ingestor.errors().len());
///
/// ingestor.config_mut().delimiter = ';';
/// ingestor.read_csv("person_data.csv")?;
/// for e in ingestor.errors() {
///     println!("{e}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    config: ReaderConfig,
    session: Session,
}

impl Ingestor {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            session: Session::default(),
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Mutable access to the configuration; takes effect on the next read.
    pub fn config_mut(&mut self) -> &mut ReaderConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: ReaderConfig) {
        self.config = config;
    }

    /// Read the first sheet of a workbook, in workbook order.
    ///
    /// This is the sheet a spreadsheet application opens on unless the file was saved with a
    /// different tab selected; the saved active-sheet flag is not consulted.
    pub fn read_excel(&mut self, path: impl AsRef<Path>) -> IngestionResult<()> {
        let path = path.as_ref();
        self.replace_with(|config| excel::read_excel_from_path(path, config))
    }

    /// Read a delimited text file.
    pub fn read_csv(&mut self, path: impl AsRef<Path>) -> IngestionResult<()> {
        let path = path.as_ref();
        self.replace_with(|config| csv::read_csv_from_path(path, config))
    }

    /// Read delimited text held in memory, encoded per [`ReaderConfig::encoding`].
    pub fn read_csv_bytes(&mut self, bytes: &[u8]) -> IngestionResult<()> {
        self.replace_with(|config| csv::read_csv_from_bytes(Path::new("<memory>"), bytes, config))
    }

    /// Read a file, choosing the source format from its extension unless `options.format` is set.
    ///
    /// When an observer is configured, this reports:
    ///
    /// - `on_success` on success, with header/accepted/rejected counts
    /// - `on_failure` on failure, with a computed severity
    /// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
    pub fn read_path(&mut self, path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<()> {
        let path = path.as_ref();
        let format = match options.format {
            Some(f) => f,
            None => {
                self.session = Session::default();
                SourceFormat::from_path(path)?
            }
        };

        let result = match format {
            SourceFormat::Csv => self.read_csv(path),
            SourceFormat::Excel => self.read_excel(path),
        };

        if let Some(obs) = options.observer.as_ref() {
            let ctx = IngestionContext {
                path: path.to_path_buf(),
                format,
            };
            match &result {
                Ok(()) => obs.on_success(&ctx, self.stats()),
                Err(e) => {
                    let sev = IngestionSeverity::for_error(e);
                    obs.on_failure(&ctx, sev, e);
                    if sev >= options.alert_at_or_above {
                        obs.on_alert(&ctx, sev, e);
                    }
                }
            }
        }

        result
    }

    /// Column labels of the last read.
    pub fn header(&self) -> &[String] {
        self.session.header()
    }

    /// Schema inferred by the last read, if it got past the first data row with one value per
    /// column.
    pub fn schema(&self) -> Option<&Schema> {
        self.session.schema()
    }

    /// Accepted rows of the last read.
    pub fn rows(&self) -> &[Vec<Value>] {
        self.session.rows()
    }

    /// Error records of the last read.
    pub fn errors(&self) -> &[ErrorRecord] {
        self.session.errors()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Take the results of the last read, leaving the ingestor empty.
    pub fn take_session(&mut self) -> Session {
        std::mem::take(&mut self.session)
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn stats(&self) -> IngestionStats {
        IngestionStats {
            header_columns: self.header().len(),
            accepted: self.rows().len(),
            rejected: self.errors().len(),
        }
    }

    /// Reset, then install the session produced by `read` only if it completed.
    fn replace_with<F>(&mut self, read: F) -> IngestionResult<()>
    where
        F: FnOnce(&ReaderConfig) -> IngestionResult<Session>,
    {
        self.session = Session::default();
        self.session = read(&self.config)?;
        Ok(())
    }
}
