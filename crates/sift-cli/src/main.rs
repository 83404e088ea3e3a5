//! Sift CLI
//!
//! Administration for the Sift search plugin: install and uninstall,
//! reindexing from an exported record list, ad hoc searches, and the
//! options file.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod cli;
mod config_handlers;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sift::{
    AddonManager, FacetRegistry, IndexableField, MemoryRecordSource, SearchOptions, SearchPlugin,
    SearchRequest, SearchResponse, create_search_client,
};

use crate::cli::{Args, Command};
use crate::config_handlers::{Paths, handle_config_command};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,sift=debug".into()),
        )
        .init();

    let paths = Paths::resolve(&args)?;
    tracing::debug!(?paths, "Resolved paths");

    if let Command::Config { action } = &args.command {
        return Ok(handle_config_command(&paths, action)?);
    }

    let options = SearchOptions::load(Some(paths.options.as_path()))?;
    let mut plugin = build_plugin(&paths, options, args.memory)?;

    match args.command {
        Command::Install { fields } => {
            let fields = match fields {
                Some(path) => read_fields(&path)?,
                None => Vec::new(),
            };
            plugin.on_install(&fields)?;
            println!(
                "Installed {} facet(s) into {}",
                plugin.facets().len(),
                paths.facets.display()
            );
        }
        Command::Uninstall => {
            plugin.on_uninstall().await?;
            println!("Uninstalled");
        }
        Command::Reindex { records } => {
            let content = std::fs::read_to_string(&records)
                .with_context(|| format!("Failed to read {}", records.display()))?;
            let source = MemoryRecordSource::from_json_str(&content)?;
            let count = plugin.reindex(&source).await?;
            println!("Indexed {count} of {} record(s)", source.len());
        }
        Command::Search { query, facet, page } => {
            let mut request = SearchRequest::new(query, plugin.options()).with_page(page);
            if let Some(facet) = facet {
                request = request.with_facet(facet);
            }
            let response = plugin.search(&request).await?;
            print_response(&response, plugin.facets());
        }
        Command::Config { .. } => {}
    }

    Ok(())
}

fn build_plugin(paths: &Paths, options: SearchOptions, memory: bool) -> Result<SearchPlugin> {
    let client = create_search_client(&options, memory)?;
    let facets = FacetRegistry::open(&paths.facets)?;
    Ok(SearchPlugin::new(
        Arc::from(client),
        AddonManager::new(&paths.addons),
        facets,
        options,
    )
    .with_options_path(&paths.options))
}

fn read_fields(path: &Path) -> Result<Vec<IndexableField>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse field list {}", path.display()))
}

fn print_response(response: &SearchResponse, facets: &FacetRegistry) {
    let pagination = &response.pagination;
    println!(
        "{} result(s) for '{}' (page {} of {})",
        response.results.num_found,
        response.query,
        pagination.page,
        pagination.total_pages()
    );

    for doc in &response.results.documents {
        let title = doc
            .values("title_t")
            .first()
            .map(String::as_str)
            .unwrap_or("[Untitled]");
        println!("  {}  {title}", doc.id());
    }

    for key in facets.displayed_keys() {
        let counts = response.results.facet(&key);
        if counts.is_empty() {
            continue;
        }
        println!("{}:", facets.label_for(&key));
        for count in counts {
            println!("  {} ({})", count.value, count.count);
        }
    }
}
