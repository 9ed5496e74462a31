// src/template/headers.rs

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::IngestError;

/// The five template sections that span a table axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    LastenCategorien,
    BatenCategorien,
    BalansDatums,
    Taakvelden,
    Balanscodes,
}

impl Axis {
    pub const ALL: [Axis; 5] = [
        Axis::LastenCategorien,
        Axis::BatenCategorien,
        Axis::BalansDatums,
        Axis::Taakvelden,
        Axis::Balanscodes,
    ];

    /// Key of the section in the definitions document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::LastenCategorien => "LastenCategorien",
            Axis::BatenCategorien => "BatenCategorien",
            Axis::BalansDatums => "BalansDatums",
            Axis::Taakvelden => "Taakvelden",
            Axis::Balanscodes => "Balanscodes",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderEntry {
    pub code: String,
    pub omschrijving: Option<String>,
}

/// Ordered axis labels, in the order the template declares them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub axis: Axis,
    pub entries: Vec<HeaderEntry>,
}

impl Header {
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.code.as_str())
    }
}

/// Render a code-like JSON scalar. Numbers keep their JSON text form.
pub(crate) fn code_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn label_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => o.get("omschrijving").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn entry_from_item(item: &Value) -> Option<HeaderEntry> {
    match item {
        Value::Object(o) => Some(HeaderEntry {
            code: o.get("code").and_then(code_of)?,
            omschrijving: label_of(item),
        }),
        scalar => Some(HeaderEntry {
            code: code_of(scalar)?,
            omschrijving: None,
        }),
    }
}

/// Extract the ordered entries of `axis` from a definitions document.
///
/// Accepted section shapes:
///  - an array of `{"code": .., "omschrijving": ..}` objects
///  - an array of plain codes
///  - an object mapping code to a label string or a `{"omschrijving": ..}` object
///
/// A section without entries is an error: the tables along it would be empty.
pub fn headers(template: &Value, axis: Axis) -> Result<Header, IngestError> {
    let section = template
        .get(axis.as_str())
        .ok_or_else(|| IngestError::MissingSection(axis.to_string()))?;
    let malformed = || IngestError::MalformedSection(axis.to_string());

    let entries = match section {
        Value::Array(items) => items
            .iter()
            .map(entry_from_item)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(malformed)?,
        Value::Object(map) => map
            .iter()
            .map(|(code, v)| HeaderEntry {
                code: code.clone(),
                omschrijving: label_of(v),
            })
            .collect(),
        _ => return Err(malformed()),
    };
    if entries.is_empty() {
        return Err(IngestError::EmptySection(axis.to_string()));
    }

    Ok(Header { axis, entries })
}
