use clap::Parser;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod core;
mod export;
mod navigation;
mod query;
mod utils;
mod web;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("geo_catalog=debug,info")
    } else {
        EnvFilter::new("geo_catalog=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let source = cli.catalog_source();
    let issue_links = cli.issue_links();

    match cli.command {
        cli::Commands::Datasets(args) => {
            let catalog = cli::load_catalog(source, cli.verbose)?;
            cli::datasets::run(args, &catalog, &issue_links, cli.format, cli.verbose)?;
        }
        cli::Commands::Attributes(args) => {
            let catalog = cli::load_catalog(source, cli.verbose)?;
            cli::attributes::run(args, &catalog, &issue_links, cli.format)?;
        }
        cli::Commands::Topics => {
            let catalog = cli::load_catalog(source, cli.verbose)?;
            cli::run_topics(&catalog, cli.format)?;
        }
        cli::Commands::Open(args) => {
            let catalog = cli::load_catalog(source, cli.verbose)?;
            cli::open::run(args, &catalog, cli.format)?;
        }
        cli::Commands::Export(args) => {
            let catalog = cli::load_catalog(source, cli.verbose)?;
            cli::export::run(args, &catalog, &issue_links, cli.verbose)?;
        }
        cli::Commands::Serve(args) => {
            let state = web::server::AppState::new(source)
                .with_issue_links(issue_links)
                .with_cold_start(args.cold_start.into());
            web::server::run(args, state)?;
        }
    }

    Ok(())
}
