pub mod normalize;
pub mod validate;

pub use normalize::{normalize, OPTIONAL_SECTIONS};
pub use validate::validate;

/// The schema every uploaded dataset is checked against.
pub const SCHEMA_FILENAME: &str = "iv3_data_schema_v1_0.json";
