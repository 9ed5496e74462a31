// src/template/mod.rs

pub mod headers;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::IngestError;
use crate::fetch::{Fetched, ResourceFetcher, ResourceKind};

pub use headers::{headers, Axis, Header, HeaderEntry};

/// Metadata values end up in a URL path, so they are limited to a safe set.
static SAFE_COMPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("static regex should compile"));

pub fn definitions_filename(overheidslaag: &str, boekjaar: &str) -> String {
    format!("iv3_definities_{}_{}.json", overheidslaag, boekjaar)
}

fn metadata_field<'a>(metadata: &'a Value, field: &'static str) -> Result<&'a str, IngestError> {
    let value = metadata
        .get(field)
        .and_then(Value::as_str)
        .ok_or(IngestError::MissingMetadata(field))?;
    if value.contains("..") || !SAFE_COMPONENT.is_match(value) {
        return Err(IngestError::InvalidMetadata {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Derive the definitions filename from the dataset's `metadata` object.
pub fn template_filename(metadata: &Value) -> Result<String, IngestError> {
    let overheidslaag = metadata_field(metadata, "overheidslaag")?;
    let boekjaar = metadata_field(metadata, "boekjaar")?;
    Ok(definitions_filename(overheidslaag, boekjaar))
}

/// Fetch the definitions document matching `metadata`.
pub async fn resolve(fetcher: &ResourceFetcher, metadata: &Value) -> Fetched {
    let filename = match template_filename(metadata) {
        Ok(f) => f,
        Err(e) => {
            return Fetched {
                value: None,
                errors: vec![e],
            }
        }
    };
    debug!(%filename, "resolving definitions");
    fetcher.fetch(&filename, ResourceKind::Definitions).await
}
