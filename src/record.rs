// nrcctl - CLI for the nagrestconf REST API
// Copyright (C) 2024 The nrcctl authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::catalog::EntityKind;
use crate::encoding::Normalizer;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of records")]
    NotAnArray,
    #[error("record {index} is not an array of field objects")]
    UnexpectedShape { index: usize },
    #[error("field `{field}` of record {index} holds a nested value")]
    NestedValue { index: usize, field: String },
}

/// One configuration object. Values are stored in the catalog order of its
/// kind, so iteration order never depends on how the record was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: EntityKind,
    values: Vec<String>,
}

impl Record {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            values: vec![String::new(); kind.fields().len()],
        }
    }

    /// Builds a record from name/value pairs, ignoring names outside the
    /// catalog.
    #[cfg(test)]
    pub fn from_pairs<'a, I>(kind: EntityKind, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut record = Self::new(kind);
        for (name, value) in pairs {
            record.set(name, value);
        }
        record
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.kind
            .position(field)
            .map(|idx| self.values[idx].as_str())
    }

    /// Returns false when `field` is not part of the catalog.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.kind.position(field) {
            Some(idx) => {
                self.values[idx] = value.into();
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.kind
            .fields()
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }
}

/// Decodes a `show/<kind>` payload: an array of records, each an array of
/// single-key objects such as `[{"name":"web1"},{"alias":"Web"}]`.
pub fn decode_records(
    kind: EntityKind,
    body: &str,
    normalizer: &Normalizer,
) -> Result<Vec<Record>, RecordError> {
    let parsed: Value = serde_json::from_str(body)?;
    let Value::Array(items) = parsed else {
        return Err(RecordError::NotAnArray);
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Array(entries) = item else {
            return Err(RecordError::UnexpectedShape { index });
        };
        let mut record = Record::new(kind);
        for entry in entries {
            let Value::Object(map) = entry else {
                return Err(RecordError::UnexpectedShape { index });
            };
            for (name, value) in map {
                if !kind.contains(&name) {
                    continue;
                }
                let raw = match value {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    Value::Array(_) | Value::Object(_) => {
                        return Err(RecordError::NestedValue { index, field: name });
                    }
                };
                let value = if kind.is_encoded(&name) {
                    normalizer.decode_or_keep(&raw)
                } else {
                    raw
                };
                record.set(&name, value);
            }
        }
        records.push(record);
    }
    Ok(records)
}

/// Decodes the array of output lines returned by `check` and `apply`.
pub fn decode_output_lines(body: &str) -> Result<Vec<String>, RecordError> {
    let parsed: Value = serde_json::from_str(body)?;
    match parsed {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect()),
        _ => Err(RecordError::NotAnArray),
    }
}
