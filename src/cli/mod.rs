//! Command-line interface for geo-catalog.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **datasets**: List/search datasets or show one with its attributes
//! - **attributes**: List/search attributes or show one with the datasets using it
//! - **topics**: List the topics used for faceting
//! - **open**: Resolve a deep link the way the browser does on first load
//! - **export**: Write an ArcGIS schema script, a change-request link, or a normalized catalog
//! - **serve**: Start the interactive web interface
//!
//! ## Usage
//!
//! ```text
//! # Search datasets, limited to one topic
//! geo-catalog datasets list fire --topic Hazards
//!
//! # Show an attribute and every dataset that uses it
//! geo-catalog attributes show admin_unit
//!
//! # Use a remote catalog and JSON output
//! geo-catalog --catalog https://example.org/catalog.json --format json datasets list
//!
//! # Generate an arcpy script for a dataset
//! geo-catalog export schema blm_roads --output ./scripts
//!
//! # Start web UI
//! geo-catalog serve --port 8080 --open
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::catalog::source::CatalogSource;
use crate::catalog::store::{Catalog, CatalogStore};
use crate::export::issue::{IssueLinkBuilder, DEFAULT_ISSUE_BASE};
use crate::navigation::navigator::ColdStart;

pub mod attributes;
pub mod datasets;
pub mod export;
pub mod open;

#[derive(Parser)]
#[command(name = "geo-catalog")]
#[command(author = "Public Lands Data Catalog contributors")]
#[command(version)]
#[command(about = "Browse, search and cross-link a geospatial dataset catalog")]
#[command(
    long_about = "geo-catalog loads a JSON catalog of datasets and the attributes (fields) they carry.\n\nIt lets you:\n- Search datasets and attributes, optionally by topic\n- Follow links from a dataset to its attributes and back\n- Resolve shareable #dataset=/#attribute= links\n- Export ArcGIS schema scripts and change-request links"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Catalog file or http(s) URL (defaults to the built-in sample catalog)
    #[arg(short, long, global = true)]
    pub catalog: Option<String>,

    /// Base URL for change-request links
    #[arg(long, global = true, default_value = DEFAULT_ISSUE_BASE)]
    pub issue_base: String,
}

impl Cli {
    #[must_use]
    pub fn catalog_source(&self) -> CatalogSource {
        CatalogSource::from_arg(self.catalog.as_deref())
    }

    #[must_use]
    pub fn issue_links(&self) -> IssueLinkBuilder {
        IssueLinkBuilder::new(&self.issue_base)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search and inspect datasets
    Datasets(datasets::DatasetsArgs),

    /// Search and inspect attributes
    Attributes(attributes::AttributesArgs),

    /// List topics across all datasets
    Topics,

    /// Resolve a #dataset=/#attribute= link against the catalog
    Open(open::OpenArgs),

    /// Generate artifacts from catalog entries
    Export(export::ExportArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    /// What to select when a page opens without a link
    #[arg(long, value_enum, default_value = "first-entity")]
    pub cold_start: ColdStartArg,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Cold-start policy argument for CLI
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ColdStartArg {
    /// Select nothing
    Nothing,
    /// Select the first dataset and first attribute
    FirstEntity,
}

impl From<ColdStartArg> for ColdStart {
    fn from(arg: ColdStartArg) -> Self {
        match arg {
            ColdStartArg::Nothing => ColdStart::Nothing,
            ColdStartArg::FirstEntity => ColdStart::FirstEntity,
        }
    }
}

/// Load the catalog for a one-shot command
///
/// # Errors
///
/// Returns an error if the runtime cannot start or the catalog cannot be
/// fetched or parsed.
pub fn load_catalog(source: CatalogSource, verbose: bool) -> anyhow::Result<Arc<Catalog>> {
    let description = source.to_string();
    let store = CatalogStore::new(source);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let catalog = runtime
        .block_on(store.load())
        .with_context(|| format!("Error loading catalog from {description}"))?;

    if verbose {
        eprintln!(
            "Loaded {} catalog with {} datasets and {} attributes",
            catalog.shape(),
            catalog.dataset_count(),
            catalog.attribute_count()
        );
    }

    Ok(catalog)
}

/// Print the distinct topics
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run_topics(catalog: &Catalog, format: OutputFormat) -> anyhow::Result<()> {
    let topics = catalog.topics();
    match format {
        OutputFormat::Text => {
            println!("Topics ({})\n", topics.len());
            for topic in &topics {
                let count = catalog
                    .datasets()
                    .iter()
                    .filter(|d| d.topics.iter().any(|t| t == topic))
                    .count();
                println!("{topic:<30} {count:>4}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&topics)?);
        }
        OutputFormat::Tsv => {
            println!("topic");
            for topic in &topics {
                println!("{topic}");
            }
        }
    }
    Ok(())
}

/// Shorten a cell for text tables
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
