//! Error types for the ingestion pipeline.
//!
//! The `Display` output of every variant is the message shown to the person
//! who uploaded the file, so it stays in Dutch like the Iv3 standard itself.

use thiserror::Error;

use crate::fetch::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// None of the candidate encodings could turn the bytes into text.
    #[error("Het bestand kon niet gelezen worden. Geef een geschikt json-bestand.")]
    Unreadable,

    /// The bytes decoded as text, but the text is not JSON.
    #[error("{name} is geen json-bestand")]
    NotJson { name: String },

    #[error("Fout bij ophalen {kind}: {filename} (foutcode #{code})")]
    Fetch {
        kind: ResourceKind,
        filename: String,
        code: u16,
    },

    #[error("Het schemabestand is ongeldig: {0}")]
    InvalidSchema(String),

    #[error("Schemafout op {path}: {message}")]
    Schema { path: String, message: String },

    #[error("Metadata mist het veld {0}")]
    MissingMetadata(&'static str),

    #[error("Metadata bevat een ongeldige waarde voor {field}: {value}")]
    InvalidMetadata { field: &'static str, value: String },

    #[error("Definitiebestand mist de sectie {0}")]
    MissingSection(String),

    #[error("Sectie {0} in het definitiebestand heeft een onbekende vorm")]
    MalformedSection(String),

    #[error("Sectie {0} in het definitiebestand is leeg")]
    EmptySection(String),

    #[error("Het databestand heeft geen geldige Iv3-structuur: {0}")]
    MalformedDataset(String),
}
