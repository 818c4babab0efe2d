//! Free-text search over catalog entities.
//!
//! Search is deliberately plain: a query matches when its trimmed, lowercased
//! text is a substring of the entity's lowercased search text. There is no
//! ranking, tokenization or stemming, and results keep catalog order.
//!
//! - Datasets search their id, title, description, topics and keywords
//! - Attributes search their key, label and description
//! - An optional topic facet requires exact topic membership (AND-ed with text)
//!
//! ## Example
//!
//! ```rust,no_run
//! use geo_catalog::Catalog;
//! use geo_catalog::query::{QueryEngine, SearchQuery};
//!
//! let catalog = Catalog::load_embedded().unwrap();
//! let engine = QueryEngine::new(&catalog);
//!
//! let query = SearchQuery::new("risk").with_topic(Some("Fire"));
//! for dataset in engine.datasets(&query) {
//!     println!("{}", dataset.display_name());
//! }
//! ```

pub mod engine;

pub use engine::{QueryEngine, SearchQuery, Searchable};
