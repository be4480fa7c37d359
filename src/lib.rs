//! `sheet-ingest` reads a spreadsheet workbook or a delimited text file, infers a per-column
//! schema from the data itself and splits the rows into a validated data set and an error bucket.
//!
//! No schema is supplied by the caller:
//!
//! 1. the first row (after [`ingestion::ReaderConfig::skip_rows`]) is the header
//! 2. the first data row fixes one [`types::TypeTag`] per column
//! 3. every later row is accepted if it has one value per column and each non-null value has the
//!    column's tag; otherwise it becomes a [`types::ErrorRecord`] tagged
//!    [`types::ErrorReason::WrongLength`] or [`types::ErrorReason::WrongType`]
//!
//! Text fields are coerced before comparison: numeric text becomes a float, narrowed to an integer
//! when it has no fractional part, and empty fields are null.
//!
//! ## Example
//!
//! ```rust
//! use sheet_ingest::ingestion::{Ingestor, ReaderConfig};
//! use sheet_ingest::types::{ErrorReason, TypeTag, Value};
//!
//! # fn main() -> Result<(), sheet_ingest::IngestionError> {
//! let mut ingestor = Ingestor::new(ReaderConfig::default());
//! ingestor.read_csv_bytes(b"Name,Age\nAlice,30\nBob,25\nCara,x\nDrew\n")?;
//!
//! assert_eq!(ingestor.header(), &["Name".to_string(), "Age".to_string()]);
//! assert_eq!(
//!     ingestor.schema().unwrap().tags(),
//!     &[TypeTag::String, TypeTag::Integer]
//! );
//! assert_eq!(ingestor.rows()[1], vec![Value::from("Bob"), Value::Integer(25)]);
//! assert_eq!(ingestor.errors()[0].reason, ErrorReason::WrongType);
//! assert_eq!(ingestor.errors()[1].reason, ErrorReason::WrongLength);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: the [`ingestion::Ingestor`], source adapters, configuration and observers
//! - [`types`]: values, type tags, schema and error records
//! - [`error`]: error types used across ingestion

pub mod error;
pub mod ingestion;
pub mod types;

pub use error::{IngestionError, IngestionResult, SourceError};
