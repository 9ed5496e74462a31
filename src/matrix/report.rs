// src/matrix/report.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use super::{build, compact, PivotTable, Section};
use crate::error::IngestError;
use crate::fetch::ResourceFetcher;
use crate::ingest::ingest;
use crate::template::{headers, Axis, Header};

/// Everything the presentation layer needs to show one upload.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub metadata: Value,
    /// `metadata` object of the definitions document.
    pub sjabloon_metadata: Value,
    /// One per axis, in `Axis::ALL` order.
    pub headers: Vec<Header>,
    /// One per section, in `Section::ALL` order.
    pub tables: Vec<PivotTable>,
    /// Records left out for lacking a key or an amount.
    pub skipped_records: usize,
    pub dataset: Value,
}

impl Report {
    pub fn header(&self, axis: Axis) -> Option<&Header> {
        self.headers.iter().find(|h| h.axis == axis)
    }

    pub fn table(&self, section: Section) -> Option<&PivotTable> {
        self.tables.iter().find(|t| t.section == section)
    }
}

/// Compact `dataset` and lay it out along the axes of `template`.
///
/// Expects a dataset that went through ingestion successfully.
pub fn build_report(dataset: Value, template: &Value) -> Result<Report, IngestError> {
    let axes = Axis::ALL
        .iter()
        .map(|&axis| headers(template, axis))
        .collect::<Result<Vec<Header>, IngestError>>()?;
    let header_for = |axis: Axis| {
        axes.iter()
            .find(|h| h.axis == axis)
            .ok_or_else(|| IngestError::MissingSection(axis.to_string()))
    };

    let compacted = compact(&dataset)?;
    let tables = Section::ALL
        .iter()
        .map(|&section| -> Result<PivotTable, IngestError> {
            let columns = header_for(section.column_axis())?;
            let rows = header_for(section.row_axis())?;
            Ok(build(&compacted, section, columns, rows))
        })
        .collect::<Result<Vec<_>, IngestError>>()?;

    Ok(Report {
        generated_at: Utc::now(),
        metadata: dataset.get("metadata").cloned().unwrap_or(Value::Null),
        sjabloon_metadata: template.get("metadata").cloned().unwrap_or(Value::Null),
        headers: axes,
        tables,
        skipped_records: compacted.skipped(),
        dataset,
    })
}

/// Result of [`process_upload`].
#[derive(Debug)]
pub enum Outcome {
    Report(Box<Report>),
    /// `dataset` is the best state reached before the first failing stage.
    Failed {
        dataset: Option<Value>,
        errors: Vec<IngestError>,
    },
}

/// Ingest an upload and, if that succeeds, build its report.
#[instrument(level = "info", skip(fetcher, bytes))]
pub async fn process_upload(fetcher: &ResourceFetcher, name: &str, bytes: &[u8]) -> Outcome {
    let ingestion = ingest(fetcher, name, bytes).await;
    let (dataset, template) = match (ingestion.dataset, ingestion.template) {
        (Some(d), Some(t)) if ingestion.errors.is_empty() => (d, t),
        (dataset, _) => {
            return Outcome::Failed {
                dataset,
                errors: ingestion.errors,
            }
        }
    };

    match build_report(dataset.clone(), &template) {
        Ok(report) => {
            info!(tables = report.tables.len(), "report ready");
            Outcome::Report(Box::new(report))
        }
        Err(e) => Outcome::Failed {
            dataset: Some(dataset),
            errors: vec![e],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Cell;
    use serde_json::json;

    fn template() -> Value {
        json!({
            "metadata": {"overheidslaag": "gemeente", "boekjaar": "2023", "versie": "1.0"},
            "LastenCategorien": [{"code": "4.1", "omschrijving": "Salarissen"}, {"code": "4.2"}],
            "BatenCategorien": [{"code": "3.1"}],
            "BalansDatums": [{"code": "begin"}, {"code": "eind"}],
            "Taakvelden": [{"code": "0.1"}, {"code": "T001"}],
            "Balanscodes": [{"code": "A1"}, {"code": "P1"}]
        })
    }

    fn dataset() -> Value {
        json!({
            "metadata": {"overheidslaag": "gemeente", "boekjaar": "2023"},
            "data": {
                "lasten": [
                    {"taakveld": "T001", "categorie": "4.1", "bedrag": 100},
                    {"taakveld": "T001", "categorie": "4.1", "bedrag": 250}
                ],
                "baten": [],
                "balans_lasten": [],
                "balans_baten": [{"balanscode": "A1", "categorie": "3.1", "bedrag": 0}],
                "balans_standen": [{"balanscode": "P1", "standper": "eind", "bedrag": -40}]
            }
        })
    }

    #[test]
    fn builds_five_tables_along_template_axes() {
        let report = build_report(dataset(), &template()).unwrap();
        assert_eq!(report.headers.len(), 5);
        assert_eq!(report.tables.len(), 5);
        assert_eq!(report.sjabloon_metadata["versie"], "1.0");
        assert_eq!(report.metadata["boekjaar"], "2023");
        let salarissen = &report.header(Axis::LastenCategorien).unwrap().entries[0];
        assert_eq!(salarissen.omschrijving.as_deref(), Some("Salarissen"));

        let lasten = report.table(Section::Lasten).unwrap();
        assert_eq!(lasten.rows, vec!["0.1", "T001"]);
        assert_eq!(lasten.columns, vec!["4.1", "4.2"]);
        assert_eq!(lasten.get("T001", "4.1"), Some(Cell::Bedrag(350.0)));
        assert_eq!(lasten.get("0.1", "4.1"), Some(Cell::GeenGegevens));

        let balans_lasten = report.table(Section::BalansLasten).unwrap();
        assert_eq!(balans_lasten.columns, lasten.columns);
        assert_eq!(balans_lasten.rows, vec!["A1", "P1"]);
        assert!(balans_lasten.is_blank());

        let balans_baten = report.table(Section::BalansBaten).unwrap();
        assert_eq!(balans_baten.get("A1", "3.1"), Some(Cell::Bedrag(0.0)));

        let standen = report.table(Section::BalansStanden).unwrap();
        assert_eq!(standen.columns, vec!["begin", "eind"]);
        assert_eq!(standen.get("P1", "eind"), Some(Cell::Bedrag(-40.0)));
    }

    #[test]
    fn missing_axis_fails_the_report() {
        let mut tpl = template();
        tpl.as_object_mut().unwrap().remove("BalansDatums");
        let err = build_report(dataset(), &tpl).unwrap_err();
        assert_eq!(err, IngestError::MissingSection("BalansDatums".into()));
    }

    #[test]
    fn serializes_to_json() {
        let report = build_report(dataset(), &template()).unwrap();
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["tables"][0]["section"], "lasten");
        assert_eq!(v["tables"][0]["cells"][1][0], 350.0);
        assert!(v["tables"][0]["cells"][0][0].is_null());
        assert_eq!(v["tables"][0]["row_totals"][1], 350.0);
        assert!(v["tables"][0]["row_totals"][0].is_null());
        assert_eq!(v["tables"][0]["total"], 350.0);
        assert_eq!(v["headers"][3]["axis"], "Taakvelden");
        assert_eq!(v["skipped_records"], 0);
    }

    #[test]
    fn counts_skipped_records() {
        let mut ds = dataset();
        ds["data"]["baten"] = json!([{"taakveld": "0.1", "bedrag": 5}]);
        let report = build_report(ds, &template()).unwrap();
        assert_eq!(report.skipped_records, 1);
    }

    #[test]
    fn empty_axis_fails_the_report() {
        let mut tpl = template();
        tpl["BatenCategorien"] = json!([]);
        let err = build_report(dataset(), &tpl).unwrap_err();
        assert_eq!(err, IngestError::EmptySection("BatenCategorien".into()));
    }
}
