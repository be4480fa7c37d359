//! Reader configuration: leading rows to skip plus the text dialect.
//!
//! Only `skip_rows` applies to spreadsheets; everything else only affects delimited text.

use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};

/// How line endings in decoded text are handled before parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewlineMode {
    /// Text is parsed exactly as decoded (default).
    #[default]
    Untranslated,
    /// `\r\n` and lone `\r` are rewritten to `\n` first, including inside quoted fields.
    Universal,
}

/// Options for [`crate::ingestion::Ingestor`].
///
/// Deserializes from a JSON object where every key is optional:
///
/// ```rust
/// use sheet_ingest::ingestion::ReaderConfig;
///
/// let cfg = ReaderConfig::from_json_str(r#"{"skip_rows": 2, "delimiter": ";"}"#).unwrap();
/// assert_eq!(cfg.skip_rows, 2);
/// assert_eq!(cfg.delimiter, ';');
/// assert_eq!(cfg.quote_char, '"');
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Number of leading rows (records for text) ignored before the header.
    pub skip_rows: usize,
    /// Encoding label understood by `encoding_rs` (e.g. `utf-8`, `windows-1252`, `latin1`).
    pub encoding: String,
    pub newline: NewlineMode,
    pub delimiter: char,
    pub quote_char: char,
    /// Character that makes the next character literal inside quotes. `None` disables it.
    pub escape_char: Option<char>,
    /// Whether two consecutive quote characters inside a quoted field mean one literal quote.
    pub double_quote: bool,
    /// Whether spaces directly after a delimiter are dropped.
    pub skip_leading_space: bool,
    /// `"\r\n"` accepts any of `\r`, `\n`, `\r\n`; otherwise a single ASCII character.
    pub line_terminator: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            encoding: "utf-8".to_string(),
            newline: NewlineMode::Untranslated,
            delimiter: ',',
            quote_char: '"',
            escape_char: None,
            double_quote: true,
            skip_leading_space: false,
            line_terminator: "\r\n".to_string(),
        }
    }
}

impl ReaderConfig {
    /// Parse a JSON config bundle. Missing keys take their default.
    pub fn from_json_str(input: &str) -> IngestionResult<Self> {
        serde_json::from_str(input).map_err(|e| IngestionError::config(format!("invalid json config: {e}")))
    }

    /// Load a JSON config bundle from a file.
    pub fn from_json_path(path: impl AsRef<Path>) -> IngestionResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            IngestionError::config(format!("cannot read config file ({}): {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Resolve the configured encoding label.
    pub(crate) fn resolve_encoding(&self) -> IngestionResult<&'static Encoding> {
        Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| IngestionError::config(format!("unknown encoding '{}'", self.encoding)))
    }

    /// Validate the dialect and build a `csv` reader builder from it.
    pub(crate) fn csv_builder(&self) -> IngestionResult<csv::ReaderBuilder> {
        let delimiter = ascii_byte("delimiter", self.delimiter)?;
        let quote = ascii_byte("quote_char", self.quote_char)?;
        let escape = self
            .escape_char
            .map(|c| ascii_byte("escape_char", c))
            .transpose()?;
        let terminator = match self.line_terminator.as_str() {
            "\r\n" => csv::Terminator::CRLF,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => csv::Terminator::Any(ascii_byte("line_terminator", c)?),
                    _ => {
                        return Err(IngestionError::config(format!(
                            "line_terminator must be \"\\r\\n\" or a single character, got {other:?}"
                        )));
                    }
                }
            }
        };
        if delimiter == quote {
            return Err(IngestionError::config("delimiter and quote_char must differ"));
        }

        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .quote(quote)
            .escape(escape)
            .double_quote(self.double_quote)
            .terminator(terminator);
        Ok(builder)
    }
}

fn ascii_byte(option: &str, c: char) -> IngestionResult<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(IngestionError::config(format!(
            "{option} must be a single ASCII character, got {c:?}"
        )))
    }
}
