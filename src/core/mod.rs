//! Core data types for the dataset catalog.
//!
//! This module provides the canonical records every other component works with,
//! regardless of which document layout the catalog was loaded from:
//!
//! - [`Dataset`]: A described layer or table, with its attribute references
//! - [`Attribute`]: A field definition, optionally enumerated with [`CodedValue`]s
//! - [`DatasetId`], [`AttributeKey`]: Identifier newtypes used as index keys
//! - [`GeometryType`], [`AttributeType`]: Parsed, case-insensitive type enums
//! - [`CatalogShape`]: Which document layout a catalog came from
//!
//! ## Attribute Keys
//!
//! | Layout     | Key field | Sharing                                  |
//! |------------|-----------|------------------------------------------|
//! | Normalized | `id`      | Referenced from datasets by `attribute_ids` |
//! | Embedded   | `name`    | Records with the same name are merged    |

pub mod attribute;
pub mod dataset;
pub mod types;

pub use attribute::{Attribute, CodedValue};
pub use dataset::{Dataset, ServiceLink};
pub use types::{AttributeKey, AttributeType, CatalogShape, DatasetId, GeometryType};
