//! Artifacts generated from a single catalog entry.
//!
//! - [`issue`]: Prefilled change-request links embedding the entry's source record
//! - [`schema`]: ArcGIS Python scripts that recreate a dataset's fields

pub mod issue;
pub mod schema;

pub use issue::{IssueLinkBuilder, DEFAULT_ISSUE_BASE};
pub use schema::{build_schema_script, schema_filename, FieldSpec};
