//! Delimited text ingestion.
//!
//! The whole file is read and decoded up front, then parsed with the `csv` crate under the
//! configured dialect. Every field goes through [`super::coerce::coerce_field`] before
//! validation; error records keep the field text as parsed.
//!
//! The `csv` crate drops empty lines silently, so the decoded text is scanned once beforehand to
//! find where every row (blank or not) starts. Blank lines become zero-field rows: they count
//! toward `skip_rows` and are rejected as wrong length once the header is in place.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::error::{IngestionError, IngestionResult, SourceError};
use crate::types::Value;

use super::coerce::{coerce, coerce_field};
use super::config::{NewlineMode, ReaderConfig};
use super::session::{Session, SourceRecord};

/// Read a delimited text file into a fresh [`Session`].
pub(crate) fn read_csv_from_path(path: &Path, config: &ReaderConfig) -> IngestionResult<Session> {
    // Reject a bad dialect before touching the file.
    config.csv_builder()?;
    config.resolve_encoding()?;

    let bytes = fs::read(path).map_err(|e| IngestionError::unreadable(path, e))?;
    read_csv_from_bytes(path, &bytes, config)
}

/// Read delimited text held in memory. `origin` is only used in error messages.
pub(crate) fn read_csv_from_bytes(
    origin: &Path,
    bytes: &[u8],
    config: &ReaderConfig,
) -> IngestionResult<Session> {
    let encoding = config.resolve_encoding()?;
    let builder = config.csv_builder()?;

    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(IngestionError::unreadable(
            origin,
            SourceError::Decode {
                encoding: encoding.name(),
            },
        ));
    }
    let text = match config.newline {
        NewlineMode::Untranslated => text,
        NewlineMode::Universal => Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n")),
    };
    let (text, starts) = scan_rows(&text, config);

    let mut rdr = builder.from_reader(text.as_bytes());
    let mut record = csv::StringRecord::new();
    let mut read_next = |record: &mut csv::StringRecord| {
        rdr.read_record(record)
            .map_err(|e| IngestionError::unreadable(origin, e))
    };

    let mut session = Session::default();
    let mut starts = starts.into_iter();
    let mut seen = 0usize;

    loop {
        let row_number = match starts.next() {
            Some(RowStart::Blank(line)) => {
                record.clear();
                line
            }
            Some(RowStart::Record(line)) => {
                if !read_next(&mut record)? {
                    break;
                }
                line
            }
            // The scan and the parser agree on record boundaries; this only drains leftovers.
            None => {
                if !read_next(&mut record)? {
                    break;
                }
                record
                    .position()
                    .map_or(seen + 1, |p| usize::try_from(p.line()).unwrap_or(usize::MAX))
            }
        };

        seen += 1;
        if seen <= config.skip_rows {
            continue;
        }

        let fields: Vec<String> = record.iter().map(str::to_owned).collect();
        if session.awaiting_header() {
            // A blank line cannot be the header; the next row gets the chance.
            if !fields.is_empty() {
                session.capture_header(fields);
            }
            continue;
        }

        let typed = fields.iter().map(|f| coerce_field(f)).collect();
        let tags = fields.iter().map(|f| coerce(f).type_tag()).collect();
        let raw = fields.into_iter().map(Value::String).collect();
        session.push_record(SourceRecord {
            row_number,
            raw,
            typed,
            tags,
        });
    }

    Ok(session)
}

/// Start of one row in the decoded text, with its 1-based physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowStart {
    Record(usize),
    Blank(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldState {
    Start,
    Unquoted,
    Quoted,
    QuotedEscape,
    AfterQuote,
}

/// Walk the text with the same quoting rules as the `csv` parser and list where each row starts.
///
/// With `skip_leading_space`, spaces at the start of an unquoted field are dropped from the
/// returned text, so a quote that follows them still opens a quoted field.
fn scan_rows<'a>(text: &'a str, config: &ReaderConfig) -> (Cow<'a, str>, Vec<RowStart>) {
    let strip = config.skip_leading_space;
    let crlf = config.line_terminator == "\r\n";
    let terminator = config.line_terminator.chars().next();
    let is_terminator = |c: char| {
        if crlf {
            c == '\r' || c == '\n'
        } else {
            Some(c) == terminator
        }
    };

    let mut out = strip.then(|| String::with_capacity(text.len()));
    let mut starts = Vec::new();
    let mut state = FieldState::Start;
    let mut record_open = false;
    let mut line = 1usize;
    let mut after_cr = false;

    for c in text.chars() {
        let cr_lf = after_cr && c == '\n';
        after_cr = c == '\r';

        let quoted = matches!(state, FieldState::Quoted | FieldState::QuotedEscape)
            || (state == FieldState::AfterQuote && c == config.quote_char && config.double_quote);
        let skipped = !quoted && state == FieldState::Start && strip && c == ' ';

        state = match state {
            FieldState::Quoted if Some(c) == config.escape_char => FieldState::QuotedEscape,
            FieldState::Quoted if c == config.quote_char => FieldState::AfterQuote,
            FieldState::Quoted | FieldState::QuotedEscape => FieldState::Quoted,
            FieldState::AfterQuote if quoted => FieldState::Quoted,
            _ if is_terminator(c) => {
                // `\n` right after a terminating `\r` belongs to the same terminator.
                if !record_open && !(crlf && cr_lf) {
                    starts.push(RowStart::Blank(line));
                }
                record_open = false;
                FieldState::Start
            }
            _ if skipped => FieldState::Start,
            _ if c == config.delimiter => FieldState::Start,
            FieldState::Start if c == config.quote_char => FieldState::Quoted,
            _ => FieldState::Unquoted,
        };

        if !skipped && !record_open && (quoted || !is_terminator(c)) {
            starts.push(RowStart::Record(line));
            record_open = true;
        }
        if let Some(out) = out.as_mut().filter(|_| !skipped) {
            out.push(c);
        }
        if c == '\r' || (c == '\n' && !cr_lf) {
            line += 1;
        }
    }

    let text = out.map_or(Cow::Borrowed(text), Cow::Owned);
    (text, starts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skipping_spaces() -> ReaderConfig {
        ReaderConfig {
            skip_leading_space: true,
            ..Default::default()
        }
    }

    #[test]
    fn text_is_untouched_unless_skipping_spaces() {
        let input = "a,  b\n";
        let (text, _) = scan_rows(input, &ReaderConfig::default());
        assert!(matches!(text, Cow::Borrowed(_)));
        assert_eq!(text, input);
    }

    #[test]
    fn spaces_are_dropped_only_at_unquoted_field_starts() {
        let (text, _) = scan_rows("a,  b , \"x,  y\"\n  c,d e\n", &skipping_spaces());
        assert_eq!(text, "a,b ,\"x,  y\"\nc,d e\n");
    }

    #[test]
    fn doubled_and_escaped_quotes_stay_inside_the_field() {
        let (text, _) = scan_rows("a, \"say \"\", hi\", b\n", &skipping_spaces());
        assert_eq!(text, "a,\"say \"\", hi\",b\n");

        let cfg = ReaderConfig {
            escape_char: Some('\\'),
            double_quote: false,
            ..skipping_spaces()
        };
        let (text, _) = scan_rows("a, \"x\\\", y\", z\n", &cfg);
        assert_eq!(text, "a,\"x\\\", y\",z\n");
    }

    #[test]
    fn blank_lines_are_listed_between_records() {
        let (_, starts) = scan_rows("a\n\nb\r\n\r\nc\rd", &ReaderConfig::default());
        assert_eq!(
            starts,
            vec![
                RowStart::Record(1),
                RowStart::Blank(2),
                RowStart::Record(3),
                RowStart::Blank(4),
                RowStart::Record(5),
                RowStart::Record(6),
            ]
        );
    }

    #[test]
    fn newlines_inside_quotes_are_not_blank_lines() {
        let (_, starts) = scan_rows("\"x\n\n\"\nb\n", &ReaderConfig::default());
        assert_eq!(starts, vec![RowStart::Record(1), RowStart::Record(4)]);
    }

    #[test]
    fn spaces_only_line_is_blank_when_skipping_spaces() {
        let (_, starts) = scan_rows("a\n   \nb\n", &skipping_spaces());
        assert_eq!(
            starts,
            vec![RowStart::Record(1), RowStart::Blank(2), RowStart::Record(3)]
        );

        let (_, starts) = scan_rows("a\n   \nb\n", &ReaderConfig::default());
        assert_eq!(starts.len(), 3);
        assert!(!starts.contains(&RowStart::Blank(2)));
    }

    #[test]
    fn single_character_terminator_ignores_newlines() {
        let cfg = ReaderConfig {
            line_terminator: ";".to_string(),
            ..Default::default()
        };
        let (_, starts) = scan_rows("a;;b;", &cfg);
        assert_eq!(
            starts,
            vec![RowStart::Record(1), RowStart::Blank(1), RowStart::Record(1)]
        );
    }
}
