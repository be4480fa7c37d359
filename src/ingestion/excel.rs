//! Spreadsheet ingestion (`.xlsx`, `.xls`, `.xlsb`, `.ods`, ...) via `calamine`.
//!
//! Behavior:
//! - Reads the first sheet in workbook order
//! - Counts rows and columns physically from A1, so `skip_rows` and cell positions match what a
//!   user sees in the spreadsheet application
//! - The header is the run of present cells starting at the first column of the first non-blank
//!   row; it stops at the first empty cell
//! - Absent cells keep their column position and read as [`Value::Null`]
//! - Rows with no present cells are skipped before the header and rejected as wrong length after

use std::fs::File;
use std::iter;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{TypeTag, Value};

use super::coerce::narrow_float;
use super::config::ReaderConfig;
use super::session::{Session, SourceRecord};

/// Read the first sheet of a workbook into a fresh [`Session`].
///
/// "First" is workbook order, which is the active sheet for a workbook saved with its first tab
/// selected. calamine does not expose which sheet was active when the file was saved, so a
/// workbook saved with another tab selected is still read from its first sheet.
///
/// The workbook is closed when this returns, on success and on failure.
pub(crate) fn read_excel_from_path(path: &Path, config: &ReaderConfig) -> IngestionResult<Session> {
    // calamine nests I/O failures inside per-format errors; probe first so a missing or
    // forbidden file surfaces as a plain I/O error.
    File::open(path).map_err(|e| IngestionError::unreadable(path, e))?;
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestionError::unreadable(path, e))?;

    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(Session::default());
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| IngestionError::unreadable(path, e))?;
    drop(workbook);

    Ok(read_sheet_range(&range, config))
}

fn read_sheet_range(range: &Range<Data>, config: &ReaderConfig) -> Session {
    // calamine ranges start at the first used cell, not at A1.
    let (first_row, first_col) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));

    let mut session = Session::default();
    for (idx0, row) in range.rows().enumerate() {
        let physical = first_row + idx0;
        if physical < config.skip_rows {
            continue;
        }

        let cells: Vec<Value> = iter::repeat_n(Value::Null, first_col)
            .chain(row.iter().map(raw_cell))
            .collect();
        let last_present = cells.iter().rposition(|v| !v.is_null());
        if last_present.is_none() && session.awaiting_header() {
            continue;
        }

        if session.awaiting_header() {
            let header = cells
                .iter()
                .take_while(|v| !v.is_null())
                .map(header_label)
                .collect();
            session.capture_header(header);
            continue;
        }

        let Some(last_present) = last_present else {
            // Blank row: no values, so it fails the length check.
            session.push_record(SourceRecord {
                row_number: physical + 1,
                raw: cells,
                typed: Vec::new(),
                tags: Vec::new(),
            });
            continue;
        };

        let width = (last_present + 1).max(session.header().len());
        let mut raw = cells;
        raw.resize(width, Value::Null);
        let typed: Vec<Value> = raw.iter().map(typed_cell).collect();
        let tags = typed.iter().map(TypeTag::of).collect();

        session.push_record(SourceRecord {
            // Report 1-based row number (Excel-like).
            row_number: physical + 1,
            raw,
            typed,
            tags,
        });
    }
    session
}

/// Native cell value, before integer narrowing.
fn raw_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) => Value::Float(*f),
        // No tag exists for these; carry their display text.
        Data::Bool(_)
        | Data::DateTime(_)
        | Data::DateTimeIso(_)
        | Data::DurationIso(_)
        | Data::Error(_) => Value::String(c.to_string()),
    }
}

/// Workbooks store every number as a double; whole ones are read back as integers.
fn typed_cell(v: &Value) -> Value {
    match v {
        Value::Float(f) => narrow_float(*f),
        other => other.clone(),
    }
}

fn header_label(v: &Value) -> String {
    typed_cell(v).to_string()
}
