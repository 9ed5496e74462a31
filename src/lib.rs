pub mod config;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod matrix;
pub mod schema;
pub mod template;

pub use config::Config;
pub use error::IngestError;
pub use fetch::ResourceFetcher;
pub use ingest::{ingest, Ingestion, Stage};
pub use matrix::report::{build_report, process_upload, Outcome, Report};
