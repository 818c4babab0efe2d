use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::catalog::store::Catalog;
use crate::export::issue::IssueLinkBuilder;
use crate::export::schema::{build_schema_script, schema_filename};
use crate::navigation::Locator;

#[derive(Args)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub command: ExportCommands,
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Generate an ArcGIS Python script that creates the dataset's fields
    Schema {
        /// Dataset ID
        #[arg(required = true)]
        id: String,

        /// Output file or directory. If not specified, prints to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a prefilled change-request link for a dataset or attribute
    IssueLink {
        /// Link fragment, e.g. "dataset=blm_roads" or "#attribute=admin_unit"
        #[arg(required = true)]
        locator: String,
    },

    /// Write the loaded catalog in the normalized {datasets, attributes} layout
    Normalize {
        /// Output file (JSON). If not specified, prints to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run an export subcommand
///
/// # Errors
///
/// Returns an error if the entry does not exist or the output cannot be written.
pub fn run(
    args: ExportArgs,
    catalog: &Catalog,
    issue_links: &IssueLinkBuilder,
    verbose: bool,
) -> anyhow::Result<()> {
    match args.command {
        ExportCommands::Schema { id, output } => run_schema(catalog, &id, output, verbose),
        ExportCommands::IssueLink { locator } => run_issue_link(catalog, &locator, issue_links),
        ExportCommands::Normalize { output } => run_normalize(catalog, output, verbose),
    }
}

fn run_schema(
    catalog: &Catalog,
    id: &str,
    output: Option<PathBuf>,
    verbose: bool,
) -> anyhow::Result<()> {
    let dataset = catalog
        .dataset(id)
        .ok_or_else(|| anyhow::anyhow!("Dataset not found: {id}"))?;
    let attributes = catalog.attributes_for_dataset(dataset);
    let script = build_schema_script(dataset, &attributes);

    match output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(schema_filename(dataset)?)
            } else {
                path
            };
            write_output(&path, &script)?;
            if verbose {
                eprintln!(
                    "Wrote schema for {id} ({} fields) to {}",
                    attributes.len(),
                    path.display()
                );
            }
        }
        None => println!("{script}"),
    }

    Ok(())
}

fn run_issue_link(
    catalog: &Catalog,
    locator: &str,
    issue_links: &IssueLinkBuilder,
) -> anyhow::Result<()> {
    let parsed = Locator::parse(locator).ok_or_else(|| {
        anyhow::anyhow!("Invalid link '{locator}': expected dataset=<id> or attribute=<key>")
    })?;

    let link = match &parsed {
        Locator::Dataset(id) => catalog
            .dataset(id.as_str())
            .map(|d| issue_links.for_dataset(d))
            .ok_or_else(|| anyhow::anyhow!("Dataset not found: {id}"))?,
        Locator::Attribute(key) => catalog
            .attribute(key.as_str())
            .map(|a| issue_links.for_attribute(a))
            .ok_or_else(|| anyhow::anyhow!("Attribute not found: {key}"))?,
    };

    println!("{link}");
    Ok(())
}

fn run_normalize(catalog: &Catalog, output: Option<PathBuf>, verbose: bool) -> anyhow::Result<()> {
    let json = catalog.to_normalized_json()?;

    match output {
        Some(path) => {
            write_output(&path, &json)?;
            if verbose {
                eprintln!(
                    "Wrote {} datasets and {} attributes to {}",
                    catalog.dataset_count(),
                    catalog.attribute_count(),
                    path.display()
                );
            }
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
