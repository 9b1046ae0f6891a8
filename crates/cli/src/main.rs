mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::collections::Action;
use imagepack_core::index::DEFAULT_INDEX_FILE;
use imagepack_core::store::DEFAULT_LOOKUP_FILE;

/// imagepack: turn image folders into Base64 data-URI collections
#[derive(Parser)]
#[command(name = "imagepack", version, about)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an image folder and merge CSV metadata into a lookup file
    Build {
        /// Metadata CSV file
        #[arg(long, default_value = "assets_catalogue.csv")]
        metadata: PathBuf,
        /// Image folder (default: first of images/, assets/, . holding images)
        #[arg(long)]
        images: Option<PathBuf>,
        /// Output JSON path
        #[arg(long, default_value = DEFAULT_LOOKUP_FILE)]
        output: PathBuf,
        /// Process only the first N images
        #[arg(long)]
        limit: Option<usize>,
        /// List images and metadata match status without converting
        #[arg(long)]
        list_only: bool,
    },
    /// Search a lookup file by tags, description, category or keyword
    Search {
        /// Lookup file path
        #[arg(long, default_value = DEFAULT_LOOKUP_FILE)]
        lookup: PathBuf,
        /// Tag to require (repeat for AND)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Search in descriptions
        #[arg(long)]
        description: Option<String>,
        /// Filter by category (exact, case-insensitive)
        #[arg(long)]
        category: Option<String>,
        /// Search across all text fields
        #[arg(long)]
        keyword: Option<String>,
        /// Search within keys
        #[arg(long)]
        key: Option<String>,
        /// Show description, category and tags for each hit
        #[arg(long)]
        details: bool,
        /// List all categories with counts
        #[arg(long)]
        list_categories: bool,
        /// List all tags
        #[arg(long)]
        list_tags: bool,
    },
    /// Replace {{key}} placeholders in a template with data URIs
    Inject {
        /// Template file
        template: PathBuf,
        /// Where to write the result
        output: PathBuf,
        /// Lookup file path
        #[arg(long, default_value = DEFAULT_LOOKUP_FILE)]
        lookup: PathBuf,
    },
    /// Report size statistics for a lookup file
    Stats {
        /// Lookup file path
        #[arg(long, default_value = DEFAULT_LOOKUP_FILE)]
        lookup: PathBuf,
        /// Metadata CSV to cross-check keys against
        #[arg(long, default_value = "assets_catalogue.csv")]
        metadata: PathBuf,
    },
    /// Convert a folder tree into a simple key → data URI collection
    Convert {
        /// Folder to convert (searched recursively)
        source: PathBuf,
        /// Output JSON path
        #[arg(long)]
        output: PathBuf,
        /// Display name recorded in the collections index
        #[arg(long)]
        name: Option<String>,
        /// Collections index to update (default: next to the output)
        #[arg(long)]
        index: Option<PathBuf>,
        /// Skip updating the collections index
        #[arg(long)]
        no_index: bool,
        /// Process only the first N images
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the collections index, or search and sample one collection
    Collections {
        /// Collections index path
        #[arg(long, default_value = DEFAULT_INDEX_FILE)]
        index: PathBuf,
        /// List every collection (the default without --search/--random)
        #[arg(long)]
        list: bool,
        /// Collection name or file, as listed in the index
        #[arg(long)]
        collection: Option<String>,
        /// Show keys containing this term
        #[arg(long, conflicts_with = "random")]
        search: Option<String>,
        /// Show N random keys
        #[arg(long)]
        random: Option<usize>,
        /// Seed for --random, for a repeatable pick
        #[arg(long, requires = "random")]
        seed: Option<u64>,
        /// Maximum search results shown
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    match cli.command {
        Commands::Build {
            metadata,
            images,
            output,
            limit,
            list_only,
        } => commands::build::run(metadata, images, &output, limit, list_only)?,
        Commands::Search {
            lookup,
            tags,
            description,
            category,
            keyword,
            key,
            details,
            list_categories,
            list_tags,
        } => {
            let collection = commands::load(&lookup)?;
            if list_categories {
                commands::search::list_categories(&collection);
            } else if list_tags {
                commands::search::list_tags(&collection);
            } else {
                let filters =
                    commands::search::filters(tags, description, category, keyword, key)?;
                commands::search::run(&collection, &filters, details)?;
            }
        }
        Commands::Inject {
            template,
            output,
            lookup,
        } => commands::inject::run(&template, &output, &lookup)?,
        Commands::Stats { lookup, metadata } => commands::stats::run(&lookup, &metadata)?,
        Commands::Convert {
            source,
            output,
            name,
            index,
            no_index,
            limit,
        } => {
            let index = if no_index {
                None
            } else {
                Some(index.unwrap_or_else(|| default_index_path(&output)))
            };
            commands::convert::run(&source, &output, name, index.as_deref(), limit)?
        }
        Commands::Collections {
            index,
            list,
            collection,
            search,
            random,
            seed,
            limit,
        } => {
            let action = match (list, search.as_deref(), random) {
                (false, Some(term), _) => Action::Search { term, limit },
                (false, None, Some(count)) => Action::Sample { count, seed },
                _ => Action::List,
            };
            commands::collections::run(&index, collection.as_deref(), action)?
        }
    }

    Ok(())
}

fn default_index_path(output: &std::path::Path) -> PathBuf {
    output
        .parent()
        .map(|p| p.join(DEFAULT_INDEX_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX_FILE))
}
