//! JSON encoding of records.
//!
//! Optional fields are written as `null`, so an absent `stashId` or `oldNum`
//! never collides with `""` or `0`. The plain decoders only check structure
//! (required fields, value types); the `_strict` variants also run each
//! record's cross-field checks.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Commit, HunkLine};
use crate::error::{RecordKind, SchemaViolation};

pub trait Record: Serialize + DeserializeOwned {
    const KIND: RecordKind;

    fn validate(&self) -> Result<(), SchemaViolation>;
}

impl Record for Commit {
    const KIND: RecordKind = RecordKind::Commit;

    fn validate(&self) -> Result<(), SchemaViolation> {
        Commit::validate(self)
    }
}

impl Record for HunkLine {
    const KIND: RecordKind = RecordKind::HunkLine;

    fn validate(&self) -> Result<(), SchemaViolation> {
        HunkLine::validate(self)
    }
}

fn malformed<R: Record>(source: serde_json::Error) -> SchemaViolation {
    SchemaViolation::Malformed {
        record: R::KIND,
        source,
    }
}

pub fn encode<R: Record>(record: &R) -> serde_json::Result<String> {
    serde_json::to_string(record)
}

pub fn encode_list<R: Record>(records: &[R]) -> serde_json::Result<String> {
    serde_json::to_string(records)
}

pub fn decode<R: Record>(text: &str) -> Result<R, SchemaViolation> {
    serde_json::from_str(text).map_err(malformed::<R>)
}

pub fn decode_list<R: Record>(text: &str) -> Result<Vec<R>, SchemaViolation> {
    serde_json::from_str(text).map_err(malformed::<R>)
}

pub fn decode_strict<R: Record>(text: &str) -> Result<R, SchemaViolation> {
    let record: R = decode(text)?;
    record.validate()?;
    Ok(record)
}

pub fn decode_list_strict<R: Record>(text: &str) -> Result<Vec<R>, SchemaViolation> {
    let records: Vec<R> = decode_list(text)?;
    for record in &records {
        record.validate()?;
    }
    Ok(records)
}
