// src/matrix/compact.rs

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::{Section, AMOUNT_FIELD};
use crate::error::IngestError;
use crate::template::headers::code_of;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub section: Section,
    pub row: String,
    pub column: String,
}

/// Amounts per (section, row, column).
///
/// Each key keeps its amounts sorted, and sums add them in that order, so the
/// total of a cell does not depend on the order of the records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Compacted {
    values: BTreeMap<CellKey, Vec<f64>>,
    skipped: usize,
}

fn sorted_sum(amounts: &[f64]) -> f64 {
    amounts.iter().sum()
}

impl Compacted {
    pub fn add(&mut self, key: CellKey, amount: f64) {
        let amounts = self.values.entry(key).or_default();
        let at = amounts.partition_point(|v| v.total_cmp(&amount).is_le());
        amounts.insert(at, amount);
    }

    pub fn get(&self, section: Section, row: &str, column: &str) -> Option<f64> {
        let key = CellKey {
            section,
            row: row.to_string(),
            column: column.to_string(),
        };
        self.values.get(&key).map(|v| sorted_sum(v))
    }

    /// All entries of one section, in key order.
    pub fn section(&self, section: Section) -> impl Iterator<Item = (&CellKey, f64)> {
        self.values
            .iter()
            .filter(move |(k, _)| k.section == section)
            .map(|(k, v)| (k, sorted_sum(v)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Records that lacked a key or amount and were left out.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

fn record_entry(section: Section, record: &Value) -> Option<(CellKey, f64)> {
    let row = record.get(section.row_field()).and_then(code_of)?;
    let column = record.get(section.column_field()).and_then(code_of)?;
    let amount = record.get(AMOUNT_FIELD).and_then(Value::as_f64)?;
    Some((
        CellKey {
            section,
            row,
            column,
        },
        amount,
    ))
}

/// Fold the records of one section into `out`.
pub fn compact_records(section: Section, records: &[Value], out: &mut Compacted) {
    for (idx, record) in records.iter().enumerate() {
        match record_entry(section, record) {
            Some((key, amount)) => out.add(key, amount),
            None => {
                warn!(
                    section = section.as_str(),
                    index = idx,
                    "record without {}/{}/{}, skipped",
                    section.row_field(),
                    section.column_field(),
                    AMOUNT_FIELD
                );
                out.skipped += 1;
            }
        }
    }
}

/// Sum every record of every section of a (normalized) dataset.
///
/// Keys unknown to the definitions document are kept; filtering happens when
/// the tables are built.
pub fn compact(dataset: &Value) -> Result<Compacted, IngestError> {
    let data = dataset
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| IngestError::MalformedDataset("data ontbreekt".into()))?;

    let mut out = Compacted::default();
    for section in Section::ALL {
        let records = match data.get(section.as_str()) {
            None => continue,
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(IngestError::MalformedDataset(format!(
                    "{} is geen lijst",
                    section
                )))
            }
        };
        compact_records(section, records, &mut out);
    }
    debug!(entries = out.len(), skipped = out.skipped, "compacted");
    Ok(out)
}
