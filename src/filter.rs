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

//! `--filter` expressions: `field:regex[,field:regex...]`.
//!
//! Every term must match for a record to be kept. A term naming a field the
//! record's kind does not have never matches, so such a filter empties the
//! result instead of failing.

use crate::catalog::EntityKind;
use crate::encoding::{EncodingMode, force_decode};
use crate::record::Record;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error(
        "malformed filter term `{term}`; expected FIELD:REGEX (percent-encode literal commas and colons)"
    )]
    Malformed { term: String },
    #[error("invalid regular expression for field `{field}`: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
pub struct FilterTerm {
    pub field: String,
    pub pattern: Regex,
}

#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    terms: Vec<FilterTerm>,
}

impl FilterSpec {
    /// Parses `field:regex[,field:regex...]`. Under [`EncodingMode::Decode`]
    /// each pattern is query-decoded first, so `+` means a space and a literal
    /// plus must be written `%2B`.
    pub fn parse(expression: &str, mode: EncodingMode) -> Result<Self, FilterError> {
        if expression.is_empty() {
            return Ok(Self::default());
        }

        let mut terms = Vec::new();
        for term in expression.split(',') {
            let Some((field, pattern)) = term.split_once(':') else {
                return Err(FilterError::Malformed {
                    term: term.to_string(),
                });
            };
            let pattern = match mode {
                EncodingMode::Decode => {
                    force_decode(pattern).unwrap_or_else(|_| pattern.to_string())
                }
                EncodingMode::Passthrough => pattern.to_string(),
            };
            let pattern = Regex::new(&pattern).map_err(|source| FilterError::InvalidPattern {
                field: field.to_string(),
                source,
            })?;
            terms.push(FilterTerm {
                field: field.to_string(),
                pattern,
            });
        }
        Ok(Self { terms })
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    /// Field names in the expression that `kind` does not define.
    pub fn unknown_fields(&self, kind: EntityKind) -> Vec<&str> {
        self.terms
            .iter()
            .map(|term| term.field.as_str())
            .filter(|field| !kind.contains(field))
            .collect()
    }

    pub fn matches(&self, record: &Record) -> bool {
        let matched = self
            .terms
            .iter()
            .filter(|term| {
                record
                    .get(&term.field)
                    .is_some_and(|value| term.pattern.is_match(value))
            })
            .count();
        matched == self.terms.len()
    }

    /// Keeps the records every term matches, in their original order.
    pub fn apply(&self, mut records: Vec<Record>) -> Vec<Record> {
        if self.is_empty() {
            return records;
        }
        records.retain(|record| self.matches(record));
        records
    }
}
