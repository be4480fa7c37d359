//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`Ingestor`] (from [`unified`]) which:
//!
//! - reads a delimited text file ([`csv`]) or the first sheet of a workbook ([`excel`])
//! - captures the header and infers a schema from the first data row ([`session`])
//! - splits every later row into accepted rows and error records
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]

pub mod coerce;
pub mod config;
pub mod csv;
pub mod excel;
pub mod observability;
pub mod session;
pub mod unified;

pub use config::{NewlineMode, ReaderConfig};
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    StdErrObserver,
};
pub use session::{SchemaState, Session};
pub use unified::{IngestionOptions, Ingestor, SourceFormat};
