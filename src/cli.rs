use std::path::PathBuf;

use clap::{Parser, Subcommand};
use klipy::types::ContentCategory;

/// Command-line client for the Klipy catalog API
#[derive(Parser)]
#[command(name = "klipy")]
#[command(about = "Browse, search and report Klipy GIFs, stickers, clips and memes", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Secret key; overrides the config file and KLIPY_SECRET_KEY
    #[arg(long, global = true)]
    pub secret_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the categories of a group
    Categories {
        /// gifs, stickers, clips or memes
        group: ContentCategory,
    },
    /// Page through trending, recent or search results
    Media {
        group: ContentCategory,
        /// "trending", "recent" or a search term
        filter: String,
        /// Maximum number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Look up items by id or slug
    Items {
        group: ContentCategory,
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        slugs: Vec<String>,
    },
    /// Record a share
    Share { group: ContentCategory, slug: String },
    /// Record a view
    View { group: ContentCategory, slug: String },
    /// Report an item
    Report {
        group: ContentCategory,
        slug: String,
        reason: String,
    },
    /// Hide an item from this installation's recents
    Hide { group: ContentCategory, slug: String },
}
