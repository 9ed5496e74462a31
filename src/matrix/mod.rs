pub mod compact;
pub mod pivot;
pub mod report;

use serde::Serialize;
use std::fmt;

use crate::template::Axis;

pub use compact::{compact, CellKey, Compacted};
pub use pivot::{build, Cell, PivotTable};

/// One data section of an Iv3 dataset, and so one pivot view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Lasten,
    Baten,
    BalansLasten,
    BalansBaten,
    BalansStanden,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Lasten,
        Section::Baten,
        Section::BalansLasten,
        Section::BalansBaten,
        Section::BalansStanden,
    ];

    /// Key of the section under `data`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Lasten => "lasten",
            Section::Baten => "baten",
            Section::BalansLasten => "balans_lasten",
            Section::BalansBaten => "balans_baten",
            Section::BalansStanden => "balans_standen",
        }
    }

    /// Record field holding the row key.
    pub fn row_field(&self) -> &'static str {
        match self {
            Section::Lasten | Section::Baten => "taakveld",
            _ => "balanscode",
        }
    }

    /// Record field holding the column key.
    pub fn column_field(&self) -> &'static str {
        match self {
            Section::BalansStanden => "standper",
            _ => "categorie",
        }
    }

    pub fn row_axis(&self) -> Axis {
        match self {
            Section::Lasten | Section::Baten => Axis::Taakvelden,
            _ => Axis::Balanscodes,
        }
    }

    pub fn column_axis(&self) -> Axis {
        match self {
            Section::Lasten | Section::BalansLasten => Axis::LastenCategorien,
            Section::Baten | Section::BalansBaten => Axis::BatenCategorien,
            Section::BalansStanden => Axis::BalansDatums,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record field holding the reported amount.
pub const AMOUNT_FIELD: &str = "bedrag";
