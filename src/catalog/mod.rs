//! Catalog storage and indexing.
//!
//! A catalog is a single JSON document describing datasets and the attributes
//! (fields) they carry. Two layouts are accepted and detected automatically:
//!
//! - **Normalized**: `{ "datasets": [...], "attributes": [...] }`, where each
//!   dataset lists its attributes by `attribute_ids`
//! - **Embedded**: `[...]` or `{ "datasets": [...] }`, where each dataset embeds
//!   its own attribute records; records sharing a `name` are merged
//!
//! The layout is resolved once by [`document::CatalogDocument`]; after that the
//! [`store::Catalog`] holds canonical records plus an [`index::CatalogIndex`]
//! for id lookups and the attribute → datasets reverse mapping.
//!
//! ## Example
//!
//! ```rust,no_run
//! use geo_catalog::Catalog;
//!
//! let catalog = Catalog::load_embedded().unwrap();
//!
//! if let Some(roads) = catalog.dataset("blm_roads") {
//!     for attribute in catalog.attributes_for_dataset(roads) {
//!         println!("{}", attribute.display_name());
//!     }
//! }
//!
//! for dataset in catalog.datasets_for_attribute("admin_unit") {
//!     println!("{}", dataset.display_name());
//! }
//! ```
//!
//! ## Loading Once
//!
//! Applications hold a [`store::CatalogStore`], which fetches from a
//! [`source::CatalogSource`] on first use and hands out the same
//! `Arc<Catalog>` afterwards:
//!
//! ```rust,no_run
//! use geo_catalog::catalog::source::CatalogSource;
//! use geo_catalog::catalog::store::CatalogStore;
//!
//! # async fn run() -> Result<(), geo_catalog::catalog::store::CatalogError> {
//! let store = CatalogStore::new(CatalogSource::parse("data/catalog.json"));
//! let catalog = store.load().await?;
//! let again = store.load().await?; // no second fetch
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod index;
pub mod source;
pub mod store;
