//! Header capture, schema inference and row validation shared by both source adapters.
//!
//! Adapters feed a [`Session`] one row at a time: the first row becomes the header, the next one
//! fixes the [`Schema`], and every row after that is validated against it.

use crate::types::{ErrorReason, ErrorRecord, Schema, TypeTag, Value};

/// Where a [`Session`] is in its header/schema lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SchemaState {
    /// No header captured yet.
    #[default]
    AwaitingHeader,
    /// Header captured; the next record fixes the schema.
    AwaitingSchema,
    /// Schema captured; later records are validated against it.
    Locked(Schema),
    /// The inference record did not have one value per header column, so no schema could be
    /// captured. Later records are only length-checked.
    Unvalidated,
}

/// One data record handed over by a source adapter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SourceRecord {
    /// 1-based physical row/line number.
    pub row_number: usize,
    /// Values as read, kept for error records.
    pub raw: Vec<Value>,
    /// Values as they land in an accepted row, in column order. Empty for a blank row.
    pub typed: Vec<Value>,
    /// Tags the schema is built from if this record is the inference row. Text fields are tagged
    /// by their coerced type, so an empty field counts as a string here while `typed` holds null.
    pub tags: Vec<TypeTag>,
}

/// Results of one read call: header, schema, accepted rows and error records.
///
/// A fresh session is built for every read and replaces the previous one wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    header: Vec<String>,
    state: SchemaState,
    rows: Vec<Vec<Value>>,
    errors: Vec<ErrorRecord>,
}

impl Session {
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// The captured schema, if the session got that far.
    pub fn schema(&self) -> Option<&Schema> {
        match &self.state {
            SchemaState::Locked(schema) => Some(schema),
            _ => None,
        }
    }

    pub fn state(&self) -> &SchemaState {
        &self.state
    }

    /// Accepted rows, each with one value per header column.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Rejected rows in source order.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty() && self.errors.is_empty()
    }

    pub(crate) fn awaiting_header(&self) -> bool {
        matches!(self.state, SchemaState::AwaitingHeader)
    }

    /// Record the header. Only the first call has an effect.
    pub(crate) fn capture_header(&mut self, header: Vec<String>) {
        if self.awaiting_header() {
            self.header = header;
            self.state = SchemaState::AwaitingSchema;
        }
    }

    /// Validate one data record and file it as an accepted row or an error record.
    pub(crate) fn push_record(&mut self, record: SourceRecord) {
        let SourceRecord {
            row_number,
            raw,
            typed,
            tags,
        } = record;
        let width = self.header.len();

        // A blank row never becomes the inference row.
        if matches!(self.state, SchemaState::AwaitingSchema) && !typed.is_empty() {
            self.state = if typed.len() == width && tags.len() == width {
                SchemaState::Locked(Schema::new(tags))
            } else {
                SchemaState::Unvalidated
            };
        }

        if typed.is_empty() || typed.len() != width {
            self.errors
                .push(ErrorRecord::new(row_number, raw, ErrorReason::WrongLength));
            return;
        }

        match &self.state {
            SchemaState::Locked(schema) if !schema.matches(&typed) => {
                self.errors
                    .push(ErrorRecord::new(row_number, raw, ErrorReason::WrongType));
            }
            _ => self.rows.push(typed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row_number: usize, values: Vec<Value>) -> SourceRecord {
        SourceRecord {
            row_number,
            raw: values.clone(),
            tags: values.iter().map(TypeTag::of).collect(),
            typed: values,
        }
    }

    fn name_age() -> Session {
        let mut s = Session::default();
        s.capture_header(vec!["Name".to_string(), "Age".to_string()]);
        s
    }

    #[test]
    fn first_record_locks_schema() {
        let mut s = name_age();
        assert_eq!(s.state(), &SchemaState::AwaitingSchema);

        s.push_record(record(2, vec!["Alice".into(), Value::Integer(30)]));
        assert_eq!(
            s.schema().map(Schema::tags),
            Some(&[TypeTag::String, TypeTag::Integer][..])
        );
        assert_eq!(s.rows().len(), 1);
    }

    #[test]
    fn later_records_never_revise_schema() {
        let mut s = name_age();
        s.push_record(record(2, vec!["Alice".into(), Value::Integer(30)]));
        s.push_record(record(3, vec!["Bob".into(), Value::Float(2.5)]));

        assert_eq!(
            s.schema().map(Schema::tags),
            Some(&[TypeTag::String, TypeTag::Integer][..])
        );
        assert_eq!(s.errors()[0].reason, ErrorReason::WrongType);
        assert_eq!(s.errors()[0].row_number, 3);
    }

    #[test]
    fn nulls_are_accepted_in_any_column() {
        let mut s = name_age();
        s.push_record(record(2, vec!["Alice".into(), Value::Integer(30)]));
        s.push_record(record(3, vec![Value::Null, Value::Null]));
        assert_eq!(s.rows().len(), 2);
        assert!(s.errors().is_empty());
    }

    #[test]
    fn null_in_inference_record_rejects_later_values_in_that_column() {
        let mut s = name_age();
        s.push_record(record(2, vec!["Alice".into(), Value::Null]));
        s.push_record(record(3, vec!["Bob".into(), Value::Integer(25)]));
        s.push_record(record(4, vec!["Cara".into(), Value::Null]));

        assert_eq!(s.rows().len(), 2);
        assert_eq!(s.errors().len(), 1);
        assert_eq!(s.errors()[0].reason, ErrorReason::WrongType);
    }

    #[test]
    fn inference_uses_tags_not_typed_values() {
        let mut s = name_age();
        s.push_record(SourceRecord {
            row_number: 2,
            raw: vec!["Alice".into(), "".into()],
            typed: vec!["Alice".into(), Value::Null],
            tags: vec![TypeTag::String, TypeTag::String],
        });
        s.push_record(record(3, vec!["Bob".into(), "Bobby".into()]));

        assert_eq!(
            s.schema().map(Schema::tags),
            Some(&[TypeTag::String, TypeTag::String][..])
        );
        assert_eq!(s.rows()[0], vec![Value::from("Alice"), Value::Null]);
        assert_eq!(s.rows().len(), 2);
    }

    #[test]
    fn blank_record_is_wrong_length_and_does_not_lock_schema() {
        let mut s = name_age();
        s.push_record(record(2, Vec::new()));
        assert_eq!(s.state(), &SchemaState::AwaitingSchema);
        assert_eq!(s.errors()[0].reason, ErrorReason::WrongLength);

        s.push_record(record(3, vec!["Alice".into(), Value::Integer(30)]));
        s.push_record(record(4, Vec::new()));
        assert!(s.schema().is_some());
        assert_eq!(s.rows().len(), 1);
        assert_eq!(s.errors().len(), 2);
        assert_eq!(s.errors()[1].row_number, 4);
    }

    #[test]
    fn wrong_width_inference_record_leaves_session_unvalidated() {
        let mut s = name_age();
        s.push_record(record(2, vec!["Alice".into()]));
        assert_eq!(s.state(), &SchemaState::Unvalidated);
        assert_eq!(s.errors()[0].reason, ErrorReason::WrongLength);

        s.push_record(record(3, vec![Value::Integer(1), "anything".into()]));
        s.push_record(record(4, vec!["too".into(), "many".into(), "fields".into()]));
        assert_eq!(s.rows(), &[vec![Value::Integer(1), Value::from("anything")]]);
        assert_eq!(s.errors()[1].reason, ErrorReason::WrongLength);
        assert!(s.schema().is_none());
    }

    #[test]
    fn header_is_captured_once() {
        let mut s = name_age();
        s.capture_header(vec!["Other".to_string()]);
        assert_eq!(s.header(), &["Name".to_string(), "Age".to_string()]);
    }

    #[test]
    fn empty_header_rejects_every_record_on_length() {
        let mut s = Session::default();
        s.capture_header(Vec::new());
        s.push_record(record(2, vec!["a".into()]));
        s.push_record(record(3, vec!["b".into()]));
        s.push_record(record(4, Vec::new()));
        assert!(s.rows().is_empty());
        assert_eq!(s.errors().len(), 3);
        assert!(s.errors().iter().all(|e| e.reason == ErrorReason::WrongLength));
    }
}
