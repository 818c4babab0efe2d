use clap::Args;

use crate::catalog::store::Catalog;
use crate::cli::{ColdStartArg, OutputFormat};
use crate::navigation::{
    ColdStart, FocusState, History, MemoryHistory, NavigationEvent, Navigator, Route,
};

#[derive(Args)]
pub struct OpenArgs {
    /// Link fragment, e.g. "#dataset=blm_roads" or "attribute=admin_unit"
    pub locator: Option<String>,

    /// What to select for slots the link does not name
    #[arg(long, value_enum, default_value = "first-entity")]
    pub cold_start: ColdStartArg,
}

/// Resolve a link the way a fresh page load would and print the focus
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(args: OpenArgs, catalog: &Catalog, format: OutputFormat) -> anyhow::Result<()> {
    let history = MemoryHistory::with_initial(args.locator.unwrap_or_default());
    let mut navigator = Navigator::new(history);
    let route = navigator.start(catalog, ColdStart::from(args.cold_start));
    let state = navigator.state().clone();
    let events = navigator.take_events();

    match format {
        OutputFormat::Text => print_text(catalog, &route, &state),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "locator": navigator.history().current(),
                "route": route.kind(),
                "view": state.view,
                "dataset": state.dataset,
                "attribute": state.attribute,
                "not_found": route.not_found_message(),
                "events": events.iter().map(describe_event).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("route\tview\tdataset\tattribute");
            println!(
                "{}\t{}\t{}\t{}",
                route.kind(),
                state.view,
                state.dataset.as_ref().map(|id| id.as_str()).unwrap_or_default(),
                state.attribute.as_ref().map(|key| key.as_str()).unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn print_text(catalog: &Catalog, route: &Route, state: &FocusState) {
    match route {
        Route::Found(locator) => println!("Route:     {locator}"),
        Route::NotFound(locator) => println!("Route:     {locator} (not found)"),
        Route::NoRoute => println!("Route:     (none)"),
    }
    println!("View:      {}", state.view);

    match &state.dataset {
        Some(id) => {
            let title = catalog
                .dataset(id.as_str())
                .map(|d| d.display_name())
                .unwrap_or_default();
            println!("Dataset:   {id} ({title})");
        }
        None => println!("Dataset:   -"),
    }
    match &state.attribute {
        Some(key) => {
            let label = catalog
                .attribute(key.as_str())
                .and_then(|a| a.label.as_deref())
                .unwrap_or_default();
            println!("Attribute: {key} ({label})");
        }
        None => println!("Attribute: -"),
    }

    if let Some(message) = route.not_found_message() {
        println!("\n{message}");
    }
}

fn describe_event(event: &NavigationEvent) -> String {
    match event {
        NavigationEvent::ViewChanged(view) => format!("view:{view}"),
        NavigationEvent::DatasetFocused(id) => format!("dataset:{id}"),
        NavigationEvent::AttributeFocused(key) => format!("attribute:{key}"),
        NavigationEvent::NotFound(locator) => format!("not_found:{}", locator.encode()),
        NavigationEvent::LocatorChanged(fragment) => format!("locator:{fragment}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DatasetId;
    use crate::navigation::Locator;

    #[test]
    fn test_describe_event() {
        assert_eq!(
            describe_event(&NavigationEvent::DatasetFocused(DatasetId::new("a"))),
            "dataset:a"
        );
        assert_eq!(
            describe_event(&NavigationEvent::NotFound(Locator::attribute("fuel type"))),
            "not_found:attribute=fuel%20type"
        );
    }
}
