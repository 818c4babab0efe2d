//! # geo-catalog
//!
//! A library for browsing a catalog of geospatial datasets and the attributes
//! (fields) they carry.
//!
//! A catalog is one JSON document. Datasets describe layers and tables:
//! geometry, ownership, topics, services. Attributes describe fields and may
//! be shared by many datasets. `geo-catalog` loads either document layout,
//! indexes it once, and answers the questions a catalog browser asks:
//!
//! ## Features
//!
//! - **Two layouts**: normalized `{datasets, attributes}` or datasets with embedded attributes
//! - **Cross-links**: attributes of a dataset, and datasets using an attribute
//! - **Search**: case-insensitive substring search with a topic facet
//! - **Deep links**: `#dataset=<id>` / `#attribute=<key>` locators with back/forward history
//! - **Exports**: ArcGIS schema scripts and prefilled change-request links
//!
//! ## Example
//!
//! ```rust,no_run
//! use geo_catalog::{Catalog, QueryEngine, SearchQuery};
//! use geo_catalog::navigation::{resolve, Route};
//!
//! // Load the embedded sample catalog
//! let catalog = Catalog::load_embedded().unwrap();
//!
//! // Search datasets
//! let engine = QueryEngine::new(&catalog);
//! for dataset in engine.datasets(&SearchQuery::new("roads")) {
//!     println!("{}", dataset.display_name());
//!     for attribute in catalog.attributes_for_dataset(dataset) {
//!         println!("  {}", attribute.display_name());
//!     }
//! }
//!
//! // Resolve a shared link
//! if let Route::Found(locator) = resolve(&catalog, "#attribute=admin_unit") {
//!     println!("{} datasets", catalog.datasets_for_attribute(locator.entity_id()).len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Catalog loading, layout detection and indexing
//! - [`core`]: Dataset and attribute records
//! - [`query`]: Free-text search
//! - [`navigation`]: Locators, focus state and history
//! - [`export`]: Schema scripts and change-request links
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: Web server for browser-based browsing

pub mod catalog;
pub mod cli;
pub mod core;
pub mod export;
pub mod navigation;
pub mod query;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::source::CatalogSource;
pub use catalog::store::{Catalog, CatalogError, CatalogStore};
pub use core::attribute::{Attribute, CodedValue};
pub use core::dataset::Dataset;
pub use core::types::*;
pub use navigation::locator::{Locator, Route};
pub use query::engine::{QueryEngine, SearchQuery};
