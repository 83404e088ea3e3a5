//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sift search plugin administration
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(author, version, about = "Sift search plugin administration tool", long_about = None)]
pub struct Args {
    /// Options file path
    #[arg(short, long, global = true, env = "SIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Addon descriptor directory
    #[arg(long, global = true, env = "SIFT_ADDONS")]
    pub addons: Option<PathBuf>,

    /// Facet registry file
    #[arg(long, global = true, env = "SIFT_FACETS")]
    pub facets: Option<PathBuf>,

    /// Use the in-memory engine instead of Solr
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Seed the facet registry and write the options file
    Install {
        /// JSON list of indexable fields (`[{"id":50,"name":"Title","set_name":"Dublin Core"}]`)
        #[arg(long)]
        fields: Option<PathBuf>,
    },
    /// Drop the facet registry, clear the index, and remove the options file
    Uninstall,
    /// Rebuild the index from a JSON list of records
    Reindex {
        /// Record list file
        #[arg(long)]
        records: PathBuf,
    },
    /// Run a search and print the results
    Search {
        /// Query text
        #[arg(default_value = "")]
        query: String,
        /// Facet filter, e.g. `tag:"maps"`
        #[arg(long)]
        facet: Option<String>,
        /// Result page
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Options file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved options file path
    Path,
    /// Print the effective options and their environment variables
    Show,
    /// Write a default options file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
