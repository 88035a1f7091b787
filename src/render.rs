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

//! Text and JSON rendering of record lists and command output.

use crate::record::Record;
use clap::ValueEnum;
use serde_json::Value;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Renderer {
    pub format: OutputFormat,
    /// Single line JSON, unindented text.
    pub compact: bool,
    /// Include empty fields.
    pub brief: bool,
}

const OBJECT_INDENT: &str = "  ";
const FIELD_INDENT: &str = "    ";

impl Renderer {
    pub fn records(&self, records: &[Record]) -> String {
        match self.format {
            OutputFormat::Text => self.records_text(records),
            OutputFormat::Json => self.records_json(records),
        }
    }

    /// Output of `check` / `apply`: one string per line.
    pub fn lines(&self, lines: &[String]) -> String {
        match self.format {
            OutputFormat::Text => lines.iter().map(|line| format!("{line}\n")).collect(),
            OutputFormat::Json => self.string_array(lines.iter().map(String::as_str)),
        }
    }

    pub fn field_names(&self, names: &[&str]) -> String {
        match self.format {
            OutputFormat::Text => names.iter().map(|name| format!("{name}\n")).collect(),
            OutputFormat::Json => self.string_array(names.iter().copied()),
        }
    }

    fn included<'a>(&self, record: &'a Record) -> impl Iterator<Item = (&'static str, &'a str)> {
        let brief = self.brief;
        record
            .iter()
            .filter(move |(_, value)| brief || !value.is_empty())
    }

    fn records_text(&self, records: &[Record]) -> String {
        let indent = if self.compact { "" } else { FIELD_INDENT };
        let mut out = String::new();
        if !self.compact || records.is_empty() {
            out.push('\n');
        }
        for record in records {
            for (name, value) in self.included(record) {
                let _ = writeln!(out, "{indent}{name}:{value}");
            }
            out.push('\n');
        }
        out
    }

    fn records_json(&self, records: &[Record]) -> String {
        if records.is_empty() {
            return "[]\n".to_string();
        }
        let (nl, object_indent, field_indent) = if self.compact {
            ("", "", "")
        } else {
            ("\n", OBJECT_INDENT, FIELD_INDENT)
        };

        let mut out = String::from("[");
        for (idx, record) in records.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            let _ = write!(out, "{nl}{object_indent}{{");
            for (pos, (name, value)) in self.included(record).enumerate() {
                if pos > 0 {
                    out.push(',');
                }
                let _ = write!(
                    out,
                    "{nl}{field_indent}{}:{}",
                    json_string(name),
                    json_string(value)
                );
            }
            let _ = write!(out, "{nl}{object_indent}}}");
        }
        let _ = writeln!(out, "{nl}]");
        out
    }

    fn string_array<'a>(&self, items: impl Iterator<Item = &'a str>) -> String {
        let (nl, indent) = if self.compact {
            ("", "")
        } else {
            ("\n", FIELD_INDENT)
        };
        let mut out = String::from("[");
        let mut empty = true;
        for (idx, item) in items.enumerate() {
            if idx > 0 {
                out.push(',');
            }
            let _ = write!(out, "{nl}{indent}{}", json_string(item));
            empty = false;
        }
        if empty {
            return "[]\n".to_string();
        }
        let _ = writeln!(out, "{nl}]");
        out
    }
}

fn json_string(value: &str) -> String {
    Value::from(value).to_string()
}
