use clap::{Args, Subcommand};

use crate::catalog::store::Catalog;
use crate::cli::{truncate, OutputFormat};
use crate::core::dataset::Dataset;
use crate::export::issue::IssueLinkBuilder;
use crate::query::engine::{QueryEngine, SearchQuery};

#[derive(Args)]
pub struct DatasetsArgs {
    #[command(subcommand)]
    pub command: DatasetsCommands,
}

#[derive(Subcommand)]
pub enum DatasetsCommands {
    /// List datasets, optionally filtered by a search term
    List {
        /// Case-insensitive text to look for in id, title, description, topics and keywords
        query: Option<String>,

        /// Only datasets carrying this exact topic
        #[arg(long)]
        topic: Option<String>,
    },

    /// Show one dataset with its attributes
    Show {
        /// Dataset ID
        #[arg(required = true)]
        id: String,
    },
}

/// Run a datasets subcommand
///
/// # Errors
///
/// Returns an error if the dataset does not exist or output cannot be serialized.
pub fn run(
    args: DatasetsArgs,
    catalog: &Catalog,
    issue_links: &IssueLinkBuilder,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    match args.command {
        DatasetsCommands::List { query, topic } => {
            let query = SearchQuery::new(query.unwrap_or_default()).with_topic(topic);
            run_list(catalog, &query, format, verbose)
        }
        DatasetsCommands::Show { id } => run_show(catalog, &id, issue_links, format),
    }
}

/// Compact JSON form used in lists and cross-links
pub fn dataset_summary(catalog: &Catalog, dataset: &Dataset) -> serde_json::Value {
    serde_json::json!({
        "id": dataset.id_str(),
        "title": dataset.title,
        "geometry_type": dataset.geometry_type,
        "glyph": dataset.geometry_type.glyph(),
        "topics": dataset.topics,
        "attribute_count": catalog.attributes_for_dataset(dataset).len(),
    })
}

fn run_list(
    catalog: &Catalog,
    query: &SearchQuery,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let engine = QueryEngine::new(catalog);
    let results = engine.datasets(query);

    match format {
        OutputFormat::Text => {
            let id_width = results
                .iter()
                .map(|d| d.id_str().unwrap_or_default().len())
                .max()
                .unwrap_or(2)
                .max(2);
            let title_width = results
                .iter()
                .map(|d| d.display_name().chars().count().min(40))
                .max()
                .unwrap_or(5)
                .max(5);
            let geometry_width = 12;
            let total_width = id_width + title_width + geometry_width + 8 + 3;

            if query.is_empty() {
                println!("Datasets ({})\n", results.len());
            } else {
                println!(
                    "Datasets ({} of {})\n",
                    results.len(),
                    catalog.dataset_count()
                );
            }
            println!(
                "{:<id_w$} {:<title_w$} {:<geo_w$} {:>8}",
                "ID",
                "Title",
                "Geometry",
                "Fields",
                id_w = id_width,
                title_w = title_width,
                geo_w = geometry_width
            );
            println!("{}", "-".repeat(total_width));

            for d in &results {
                let geometry = if d.geometry_type.is_unknown() {
                    String::new()
                } else {
                    format!("{} {}", d.geometry_type.glyph(), d.geometry_type.as_str())
                };
                println!(
                    "{:<id_w$} {:<title_w$} {:<geo_w$} {:>8}",
                    d.id_str().unwrap_or_default(),
                    truncate(d.display_name(), title_width),
                    geometry,
                    catalog.attributes_for_dataset(d).len(),
                    id_w = id_width,
                    title_w = title_width,
                    geo_w = geometry_width
                );
                if verbose && !d.topics.is_empty() {
                    println!("  └─ Topics: {}", d.topics.join(", "));
                }
            }

            if results.is_empty() {
                println!("No datasets match.");
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = results
                .iter()
                .map(|d| dataset_summary(catalog, d))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\ttitle\tgeometry_type\ttopics\tattribute_count");
            for d in &results {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    d.id_str().unwrap_or_default(),
                    d.title.as_deref().unwrap_or_default(),
                    d.geometry_type,
                    d.topics.join(","),
                    catalog.attributes_for_dataset(d).len()
                );
            }
        }
    }

    Ok(())
}

fn run_show(
    catalog: &Catalog,
    id: &str,
    issue_links: &IssueLinkBuilder,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let dataset = catalog
        .dataset(id)
        .ok_or_else(|| anyhow::anyhow!("Dataset not found: {id}"))?;
    let attributes = catalog.attributes_for_dataset(dataset);

    match format {
        OutputFormat::Text => {
            println!("Dataset: {}\n", dataset.display_name());
            println!("ID:         {id}");
            print_field("Object:", dataset.objname.as_deref());
            if !dataset.geometry_type.is_unknown() {
                println!("Geometry:   {}", dataset.geometry_type);
            }
            print_field("Owner:", dataset.owner.as_deref());
            print_field("Contact:", dataset.contact_email.as_deref());
            if !dataset.topics.is_empty() {
                println!("Topics:     {}", dataset.topics.join(", "));
            }
            if !dataset.keywords.is_empty() {
                println!("Keywords:   {}", dataset.keywords.join(", "));
            }
            print_field("Status:", dataset.status.as_deref());
            print_field("Access:", dataset.access_level.as_deref());
            print_field("Updated:", dataset.last_updated.as_deref());
            print_field("Frequency:", dataset.update_frequency.as_deref());
            print_field("Projection:", dataset.projection.as_deref());
            print_field("Standard:", dataset.metadata_standard.as_deref());

            if let Some(desc) = &dataset.description {
                println!("\nDescription: {desc}");
            }

            if !dataset.services.is_empty() {
                println!("\nServices:");
                for service in &dataset.services {
                    match &service.format {
                        Some(format) => {
                            println!("  {} ({format}): {}", service.label, service.url);
                        }
                        None => println!("  {}: {}", service.label, service.url),
                    }
                }
            }

            if let Some(notes) = &dataset.notes {
                println!("\nNotes: {notes}");
            }

            println!("\nAttributes ({}):", attributes.len());
            if attributes.is_empty() {
                println!("  No attributes listed for this dataset.");
            } else {
                println!("{:<25} {:<30} {:<12}", "Key", "Label", "Type");
                println!("{}", "-".repeat(69));
                for attribute in &attributes {
                    println!(
                        "{:<25} {:<30} {:<12}",
                        attribute.key_str().unwrap_or_default(),
                        truncate(attribute.label.as_deref().unwrap_or_default(), 30),
                        attribute.attribute_type.as_str()
                    );
                }
            }

            println!("\nRequest a change: {}", issue_links.for_dataset(dataset));
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "dataset": dataset,
                "attributes": attributes,
                "issue_link": issue_links.for_dataset(dataset),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("key\tlabel\ttype\tnullable");
            for attribute in &attributes {
                println!(
                    "{}\t{}\t{}\t{}",
                    attribute.key_str().unwrap_or_default(),
                    attribute.label.as_deref().unwrap_or_default(),
                    attribute.attribute_type,
                    attribute.nullable
                );
            }
        }
    }

    Ok(())
}

fn print_field(label: &str, value: Option<&str>) {
    if let Some(value) = value {
        println!("{label:<11} {value}");
    }
}
