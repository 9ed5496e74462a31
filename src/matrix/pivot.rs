// src/matrix/pivot.rs

use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use super::{Compacted, Section};
use crate::template::Header;

/// One table cell. A reported zero is `Bedrag(0.0)`, never `GeenGegevens`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cell {
    Bedrag(f64),
    GeenGegevens,
}

impl Cell {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Cell::Bedrag(v) => Some(*v),
            Cell::GeenGegevens => None,
        }
    }

    pub fn has_data(&self) -> bool {
        matches!(self, Cell::Bedrag(_))
    }

    /// Sum of the cells that carry data; `GeenGegevens` if none do.
    fn total<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Cell {
        cells
            .into_iter()
            .filter_map(Cell::amount)
            .fold(Cell::GeenGegevens, |acc, v| match acc {
                Cell::Bedrag(sum) => Cell::Bedrag(sum + v),
                Cell::GeenGegevens => Cell::Bedrag(v),
            })
    }
}

// numbers for amounts, null for "no data"
impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Bedrag(v) => serializer.serialize_f64(*v),
            Cell::GeenGegevens => serializer.serialize_none(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Bedrag(v) => write!(f, "{}", v),
            Cell::GeenGegevens => f.write_str("-"),
        }
    }
}

/// Dense rows x columns grid for one section.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PivotTable {
    pub section: Section,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `cells[r][c]` belongs to `rows[r]` and `columns[c]`.
    pub cells: Vec<Vec<Cell>>,
    /// Per row, the sum of its cells with data.
    pub row_totals: Vec<Cell>,
    /// Per column, the sum of its cells with data.
    pub column_totals: Vec<Cell>,
    pub total: Cell,
    /// Compacted entries of this section that no row/column pair covers.
    pub unmatched: usize,
}

impl PivotTable {
    pub fn get(&self, row: &str, column: &str) -> Option<Cell> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        Some(self.cells[r][c])
    }

    /// True when every cell is `GeenGegevens` (or there are no cells).
    pub fn is_blank(&self) -> bool {
        self.cells.iter().flatten().all(|c| !c.has_data())
    }
}

/// Cross `row_header` with `column_header` and fill each cell from `compacted`.
pub fn build(
    compacted: &Compacted,
    section: Section,
    column_header: &Header,
    row_header: &Header,
) -> PivotTable {
    let rows: Vec<String> = row_header.codes().map(str::to_string).collect();
    let columns: Vec<String> = column_header.codes().map(str::to_string).collect();

    let cells: Vec<Vec<Cell>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| match compacted.get(section, row, col) {
                    Some(v) => Cell::Bedrag(v),
                    None => Cell::GeenGegevens,
                })
                .collect::<Vec<Cell>>()
        })
        .collect();
    let row_totals: Vec<Cell> = cells.iter().map(|row| Cell::total(row)).collect();
    let column_totals: Vec<Cell> = (0..columns.len())
        .map(|c| Cell::total(cells.iter().map(|row| &row[c])))
        .collect();
    let total = Cell::total(&row_totals);

    let row_set: HashSet<&str> = rows.iter().map(String::as_str).collect();
    let col_set: HashSet<&str> = columns.iter().map(String::as_str).collect();
    let unmatched = compacted
        .section(section)
        .filter(|(k, _)| !row_set.contains(k.row.as_str()) || !col_set.contains(k.column.as_str()))
        .count();
    if unmatched > 0 {
        debug!(section = section.as_str(), unmatched, "entries outside the definitions");
    }

    PivotTable {
        section,
        rows,
        columns,
        cells,
        row_totals,
        column_totals,
        total,
        unmatched,
    }
}

const TOTAL_LABEL: &str = "totaal";

impl fmt::Display for PivotTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // last column and last line hold the totals
        let rendered: Vec<Vec<String>> = self
            .cells
            .iter()
            .zip(&self.row_totals)
            .map(|(row, total)| {
                row.iter()
                    .chain(std::iter::once(total))
                    .map(Cell::to_string)
                    .collect::<Vec<_>>()
            })
            .chain(std::iter::once(
                self.column_totals
                    .iter()
                    .chain(std::iter::once(&self.total))
                    .map(Cell::to_string)
                    .collect::<Vec<_>>(),
            ))
            .collect();
        let labels: Vec<&str> = self
            .rows
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(TOTAL_LABEL))
            .collect();
        let names: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(TOTAL_LABEL))
            .collect();

        let first = labels
            .iter()
            .map(|l| l.len())
            .max()
            .unwrap_or(0)
            .max(self.section.as_str().len());
        let widths: Vec<usize> = names
            .iter()
            .enumerate()
            .map(|(c, name)| {
                rendered
                    .iter()
                    .map(|row| row[c].len())
                    .max()
                    .unwrap_or(0)
                    .max(name.len())
            })
            .collect();

        write!(f, "{:<first$}", self.section.as_str())?;
        for (name, w) in names.iter().zip(&widths) {
            write!(f, " | {:>w$}", name, w = *w)?;
        }
        writeln!(f)?;
        for (label, cells) in labels.iter().zip(&rendered) {
            write!(f, "{:<first$}", label)?;
            for (cell, w) in cells.iter().zip(&widths) {
                write!(f, " | {:>w$}", cell, w = *w)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
