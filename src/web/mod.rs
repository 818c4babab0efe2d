//! Web server for browsing the catalog in a browser.
//!
//! This module serves a single-page interface with two tabs (datasets and
//! attributes) plus the JSON API it is built on. Selections are kept in the
//! URL fragment (`#dataset=<id>`, `#attribute=<key>`) so any view can be
//! shared as a link.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080 with the built-in catalog
//! geo-catalog serve
//!
//! # Serve a catalog file and auto-open the browser
//! geo-catalog --catalog data/catalog.json serve --port 3000 --open
//!
//! # Open pages with nothing selected
//! geo-catalog serve --cold-start nothing
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /` - Main page
//! - `GET /api/catalog` - Shape, counts, topics and cold-start policy
//! - `GET /api/datasets?q=&topic=` - Search datasets
//! - `GET /api/datasets/{id}` - One dataset with its attributes and change-request link
//! - `GET /api/datasets/{id}/schema` - ArcGIS schema script download
//! - `GET /api/attributes?q=` - Search attributes
//! - `GET /api/attributes/{key}` - One attribute with the datasets that use it
//! - `GET /api/resolve?locator=` - Initial focus for a link fragment
//!
//! Until the catalog loads, API calls answer `503 Service Unavailable` with
//! `"Error loading catalog."`; each request retries the load.

pub mod server;
