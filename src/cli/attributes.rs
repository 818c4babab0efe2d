use clap::{Args, Subcommand};

use crate::catalog::store::Catalog;
use crate::cli::datasets::dataset_summary;
use crate::cli::{truncate, OutputFormat};
use crate::export::issue::IssueLinkBuilder;
use crate::query::engine::{QueryEngine, SearchQuery};

#[derive(Args)]
pub struct AttributesArgs {
    #[command(subcommand)]
    pub command: AttributesCommands,
}

#[derive(Subcommand)]
pub enum AttributesCommands {
    /// List attributes, optionally filtered by a search term
    List {
        /// Case-insensitive text to look for in key, label and description
        query: Option<String>,
    },

    /// Show one attribute and the datasets that use it
    Show {
        /// Attribute key
        #[arg(required = true)]
        key: String,
    },
}

/// Run an attributes subcommand
///
/// # Errors
///
/// Returns an error if the attribute does not exist or output cannot be serialized.
pub fn run(
    args: AttributesArgs,
    catalog: &Catalog,
    issue_links: &IssueLinkBuilder,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match args.command {
        AttributesCommands::List { query } => {
            run_list(catalog, &SearchQuery::new(query.unwrap_or_default()), format)
        }
        AttributesCommands::Show { key } => run_show(catalog, &key, issue_links, format),
    }
}

fn run_list(catalog: &Catalog, query: &SearchQuery, format: OutputFormat) -> anyhow::Result<()> {
    let results = QueryEngine::new(catalog).attributes(query);

    match format {
        OutputFormat::Text => {
            let key_width = results
                .iter()
                .map(|a| a.key_str().unwrap_or_default().len())
                .max()
                .unwrap_or(3)
                .max(3);
            let label_width = results
                .iter()
                .map(|a| a.label.as_deref().unwrap_or_default().chars().count().min(35))
                .max()
                .unwrap_or(5)
                .max(5);
            let total_width = key_width + label_width + 12 + 8 + 3;

            println!("Attributes ({})\n", results.len());
            println!(
                "{:<key_w$} {:<label_w$} {:<12} {:>8}",
                "Key",
                "Label",
                "Type",
                "Datasets",
                key_w = key_width,
                label_w = label_width
            );
            println!("{}", "-".repeat(total_width));

            for a in &results {
                let used_by = a
                    .key_str()
                    .map_or(0, |key| catalog.datasets_for_attribute(key).len());
                println!(
                    "{:<key_w$} {:<label_w$} {:<12} {:>8}",
                    a.key_str().unwrap_or_default(),
                    truncate(a.label.as_deref().unwrap_or_default(), label_width),
                    a.attribute_type.as_str(),
                    used_by,
                    key_w = key_width,
                    label_w = label_width
                );
            }

            if results.is_empty() {
                println!("No attributes match.");
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = results
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "id": a.key_str(),
                        "label": a.label,
                        "type": a.attribute_type,
                        "dataset_count": a
                            .key_str()
                            .map_or(0, |key| catalog.datasets_for_attribute(key).len()),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tlabel\ttype\tnullable");
            for a in &results {
                println!(
                    "{}\t{}\t{}\t{}",
                    a.key_str().unwrap_or_default(),
                    a.label.as_deref().unwrap_or_default(),
                    a.attribute_type,
                    a.nullable
                );
            }
        }
    }

    Ok(())
}

fn run_show(
    catalog: &Catalog,
    key: &str,
    issue_links: &IssueLinkBuilder,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let attribute = catalog
        .attribute(key)
        .ok_or_else(|| anyhow::anyhow!("Attribute not found: {key}"))?;
    let datasets = catalog.datasets_for_attribute(key);

    match format {
        OutputFormat::Text => {
            println!("Attribute: {}\n", attribute.display_name());
            println!("Key:         {key}");
            println!("Type:        {}", attribute.attribute_type);
            println!("Nullable:    {}", if attribute.nullable { "yes" } else { "no" });
            if let Some(example) = attribute.example_text() {
                println!("Example:     {example}");
            }
            if let Some(desc) = &attribute.description {
                println!("\nDescription: {desc}");
            }

            let values = attribute.coded_values();
            if !values.is_empty() {
                println!("\nAllowed values:");
                println!("{:<10} {:<25} Description", "Code", "Label");
                println!("{}", "-".repeat(70));
                for value in values {
                    println!(
                        "{:<10} {:<25} {}",
                        value.code_text(),
                        value.label_text(),
                        value.description_text()
                    );
                }
            }

            println!("\nUsed in datasets ({}):", datasets.len());
            if datasets.is_empty() {
                println!("  This attribute is not used by any dataset.");
            }
            for dataset in &datasets {
                println!(
                    "  {} ({})",
                    dataset.display_name(),
                    dataset.id_str().unwrap_or_default()
                );
            }

            println!("\nRequest a change: {}", issue_links.for_attribute(attribute));
        }
        OutputFormat::Json => {
            let used_by: Vec<serde_json::Value> = datasets
                .iter()
                .map(|d| dataset_summary(catalog, d))
                .collect();
            let output = serde_json::json!({
                "attribute": attribute,
                "datasets": used_by,
                "issue_link": issue_links.for_attribute(attribute),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("dataset_id\ttitle");
            for dataset in &datasets {
                println!(
                    "{}\t{}",
                    dataset.id_str().unwrap_or_default(),
                    dataset.title.as_deref().unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
