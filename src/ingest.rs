// src/ingest.rs

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::decode::decode;
use crate::error::IngestError;
use crate::fetch::{ResourceFetcher, ResourceKind};
use crate::schema::{self, SCHEMA_FILENAME};
use crate::template;

/// Pipeline stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Decode,
    FetchSchema,
    Validate,
    Normalize,
    ResolveTemplate,
    ValidateAgainstTemplate,
    Done,
}

/// Outcome of one ingestion call.
///
/// `errors` is empty iff every stage succeeded; then `dataset` is normalized
/// and `template` holds the definitions document. On failure `stage` is the
/// stage that reported the errors, and `dataset` is whatever had been
/// understood by then (absent only when decoding itself failed).
#[derive(Debug, Default)]
pub struct Ingestion {
    pub dataset: Option<Value>,
    pub template: Option<Value>,
    pub errors: Vec<IngestError>,
    pub stage: Stage,
}

impl Ingestion {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn fail(dataset: Option<Value>, stage: Stage, errors: Vec<IngestError>) -> Self {
        warn!(?stage, errors = errors.len(), "ingestion stopped");
        Self {
            dataset,
            template: None,
            errors,
            stage,
        }
    }
}

/// Checking records against the definitions document is not implemented;
/// this stage accepts every dataset.
fn validate_against_template(_dataset: &Value, _template: &Value) -> Vec<IngestError> {
    Vec::new()
}

/// Read, check and normalize an uploaded Iv3 file.
///
/// Stages run strictly in order and the first one that reports errors ends
/// the call: decode, fetch schema, validate, normalize, resolve definitions.
#[instrument(level = "info", skip(fetcher, bytes), fields(size = bytes.len()))]
pub async fn ingest(fetcher: &ResourceFetcher, name: &str, bytes: &[u8]) -> Ingestion {
    // ─── decode ──────────────────────────────────────────────────────
    let decoded = decode(name, bytes);
    let dataset = match decoded.value {
        Some(v) if decoded.errors.is_empty() => v,
        _ => return Ingestion::fail(None, Stage::Decode, decoded.errors),
    };

    // ─── fetch schema ────────────────────────────────────────────────
    debug!(stage = ?Stage::FetchSchema);
    let fetched = fetcher.fetch(SCHEMA_FILENAME, ResourceKind::Schema).await;
    let schema_doc = match fetched.value {
        Some(s) if fetched.errors.is_empty() => s,
        _ => return Ingestion::fail(Some(dataset), Stage::FetchSchema, fetched.errors),
    };

    // ─── validate ────────────────────────────────────────────────────
    debug!(stage = ?Stage::Validate);
    let errors = schema::validate(&dataset, &schema_doc);
    if !errors.is_empty() {
        return Ingestion::fail(Some(dataset), Stage::Validate, errors);
    }

    // ─── normalize ───────────────────────────────────────────────────
    debug!(stage = ?Stage::Normalize);
    let dataset = schema::normalize(dataset);

    // ─── resolve definitions ─────────────────────────────────────────
    debug!(stage = ?Stage::ResolveTemplate);
    let metadata = dataset.get("metadata").unwrap_or(&Value::Null);
    let fetched = template::resolve(fetcher, metadata).await;
    let template_doc = match fetched.value {
        Some(t) if fetched.errors.is_empty() => t,
        _ => return Ingestion::fail(Some(dataset), Stage::ResolveTemplate, fetched.errors),
    };

    // ─── check against definitions ───────────────────────────────────
    debug!(stage = ?Stage::ValidateAgainstTemplate);
    let errors = validate_against_template(&dataset, &template_doc);
    if !errors.is_empty() {
        return Ingestion::fail(Some(dataset), Stage::ValidateAgainstTemplate, errors);
    }

    info!(file = name, "ingestion complete");
    Ingestion {
        dataset: Some(dataset),
        template: Some(template_doc),
        errors: Vec::new(),
        stage: Stage::Done,
    }
}
