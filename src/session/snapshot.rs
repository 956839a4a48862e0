//! Snapshot codec: flat string records for session persistence.
//!
//! A snapshot is a flat `key -> string` map carrying every field a session
//! needs to resume exactly where it left off. The map travels through the
//! key-value store as a single JSON blob per game id. Decoding is strict:
//! a missing key or unparseable value is a [`SnapshotError`], which callers
//! absorb into "no saved game" (the record is discarded, never propagated).

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use thiserror::Error;

use super::placement::Cell;

/// Flat session record. `BTreeMap` keeps blob output stable for tests.
pub type SnapshotMap = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("malformed field `{field}`: `{value}`")]
    MalformedField { field: &'static str, value: String },

    #[error("malformed record blob: {0}")]
    MalformedBlob(#[from] serde_json::Error),
}

impl SnapshotError {
    pub fn malformed(field: &'static str, value: &str) -> Self {
        SnapshotError::MalformedField {
            field,
            value: value.to_string(),
        }
    }
}

/// Serialize a record to its store blob.
pub fn to_blob(map: &SnapshotMap) -> String {
    // A string map cannot fail to serialize.
    serde_json::to_string(map).unwrap_or_default()
}

/// Parse a store blob back into a record.
pub fn from_blob(blob: &str) -> Result<SnapshotMap, SnapshotError> {
    Ok(serde_json::from_str(blob)?)
}

/// Fetch a required raw field.
pub fn require<'a>(map: &'a SnapshotMap, field: &'static str) -> Result<&'a str, SnapshotError> {
    map.get(field)
        .map(String::as_str)
        .ok_or(SnapshotError::MissingField(field))
}

/// Fetch and parse a required field.
pub fn parse<T: FromStr>(map: &SnapshotMap, field: &'static str) -> Result<T, SnapshotError> {
    let raw = require(map, field)?;
    raw.parse().map_err(|_| SnapshotError::malformed(field, raw))
}

/// Encode cells as `"x,y;x,y;..."` (empty string for no cells).
pub fn encode_cells<I: IntoIterator<Item = Cell>>(cells: I) -> String {
    let mut out = String::new();
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        let _ = write!(out, "{},{}", cell.x, cell.y);
    }
    out
}

/// Decode a `"x,y;x,y;..."` cell list.
pub fn decode_cells(field: &'static str, raw: &str) -> Result<Vec<Cell>, SnapshotError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(';')
        .map(|pair| decode_cell(field, pair))
        .collect()
}

/// Decode a single `"x,y"` cell.
pub fn decode_cell(field: &'static str, raw: &str) -> Result<Cell, SnapshotError> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| SnapshotError::malformed(field, raw))?;
    let x = x
        .parse()
        .map_err(|_| SnapshotError::malformed(field, raw))?;
    let y = y
        .parse()
        .map_err(|_| SnapshotError::malformed(field, raw))?;
    Ok(Cell { x, y })
}

/// Encode a list of display-able values as `"a,b,c"`.
pub fn encode_list<T: ToString, I: IntoIterator<Item = T>>(items: I) -> String {
    items
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode a `"a,b,c"` list (empty string decodes to an empty list).
pub fn decode_list<T: FromStr>(field: &'static str, raw: &str) -> Result<Vec<T>, SnapshotError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|item| {
            item.parse()
                .map_err(|_| SnapshotError::malformed(field, item))
        })
        .collect()
}
