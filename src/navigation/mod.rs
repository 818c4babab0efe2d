//! Focus state and deep links.
//!
//! A [`Locator`] is a shareable fragment naming one entity, such as
//! `#dataset=blm_roads` or `#attribute=admin_unit`. Resolving it against a
//! loaded catalog yields a [`Route`]:
//!
//! | Fragment                 | Route                  |
//! |--------------------------|------------------------|
//! | `#dataset=<known id>`    | `Found`                |
//! | `#attribute=<unknown>`   | `NotFound`             |
//! | empty or unrecognized    | `NoRoute`              |
//!
//! The [`Navigator`] keeps one focus slot per view and writes the active
//! view's focus back to a [`History`]. Writing an identical locator is a
//! no-op, so redundant selections never add history entries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use geo_catalog::Catalog;
//! use geo_catalog::navigation::{ColdStart, MemoryHistory, Navigator};
//!
//! let catalog = Catalog::load_embedded().unwrap();
//! let mut navigator = Navigator::new(MemoryHistory::with_initial("#dataset=blm_roads"));
//! navigator.start(&catalog, ColdStart::FirstEntity);
//!
//! navigator.select_attribute(&catalog, "admin_unit");
//! println!("{:?}", navigator.state());
//! ```

pub mod history;
pub mod locator;
pub mod navigator;

pub use history::{History, MemoryHistory};
pub use locator::{resolve, resolve_locator, Locator, Route, View};
pub use navigator::{ColdStart, FocusState, NavigationEvent, Navigator};
