// src/schema/validate.rs

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::IngestError;

/// Check `dataset` against the JSON Schema `schema`.
///
/// Returns one error per violation the validator reports; an empty vec means
/// the dataset conforms.
pub fn validate(dataset: &Value, schema: &Value) -> Vec<IngestError> {
    let validator = match jsonschema::validator_for(schema) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "schema does not compile");
            return vec![IngestError::InvalidSchema(e.to_string())];
        }
    };

    let errors: Vec<IngestError> = validator
        .iter_errors(dataset)
        .map(|e| {
            let path = e.instance_path.to_string();
            IngestError::Schema {
                path: if path.is_empty() { "/".to_string() } else { path },
                message: e.to_string(),
            }
        })
        .collect();

    debug!(violations = errors.len(), "schema validation done");
    errors
}
