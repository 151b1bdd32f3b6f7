mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use klipy::prelude::*;
use tracing_subscriber::EnvFilter;

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("klipy=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = KlipyConfig::load(cli.config.as_deref())?;
    if let Some(key) = cli.secret_key {
        config.secret_key = key;
    }
    let klipy = Klipy::connect(config).context("creating klipy client")?;

    match cli.command {
        Commands::Categories { group } => {
            print_json(&klipy.get_categories(group).await?)?;
        }
        Commands::Media { group, filter, pages } => {
            let mut items = Vec::new();
            for _ in 0..pages.max(1) {
                let page = klipy.get_media(group, &filter).await?;
                if page.is_empty() {
                    break;
                }
                items.extend(page.items);
            }
            eprintln!("{} items", items.len());
            print_json(&items)?;
        }
        Commands::Items { group, ids, slugs } => {
            print_json(&klipy.get_items(group, &ids, &slugs).await?)?;
        }
        Commands::Share { group, slug } => klipy.trigger_share(group, &slug).await?,
        Commands::View { group, slug } => klipy.trigger_view(group, &slug).await?,
        Commands::Report { group, slug, reason } => klipy.report(group, &slug, &reason).await?,
        Commands::Hide { group, slug } => klipy.hide_from_recent(group, &slug).await?,
    }
    Ok(())
}
