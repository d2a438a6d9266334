use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use offerdeck_catalog::{load_catalog_fixture, normalize};
use offerdeck_view::OfferBoard;

#[derive(Debug, Parser)]
#[command(name = "offerdeck-cli")]
#[command(about = "OfferDeck command-line interface")]
struct Cli {
    /// Catalog payload path; falls back to OFFERDECK_CATALOG, then the sample fixture.
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List visible offers, optionally filtered by category.
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one offer's details, including parsed discount lines.
    Show { key: String },
    /// Serve the JSON API.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let catalog_path = cli.catalog.clone().unwrap_or_else(default_catalog_path);

    match cli.command.unwrap_or(Commands::List { category: None }) {
        Commands::List { category } => {
            let mut board = load_board(&catalog_path)?;
            if let Some(category) = category {
                board.set_category(category);
            }
            for offer in board.visible_offers() {
                println!(
                    "{}  {}  {} coins  [{}]",
                    offer.key, offer.title, offer.coins, offer.category
                );
            }
        }
        Commands::Show { key } => {
            let mut board = load_board(&catalog_path)?;
            board.toggle_details(&key);
            let Some(detail) = board.expanded_details(Utc::now()) else {
                bail!("offer not found: {key}");
            };
            let offer = &detail.offer;
            println!("{} ({})", offer.title, offer.store_name);
            println!(
                "earn {} coins ({}% cashback), {} day discount window",
                offer.coins, offer.cashback_percent, offer.duration_days
            );
            println!("expiry: {}", detail.expiry);
            for entry in &detail.discounts {
                println!(
                    "  {}: {} \u{2192} {} ({}% OFF)",
                    entry.service, entry.original_price, entry.discounted_price, entry.discount_percent
                );
            }
            for link in &offer.social_links {
                println!("  contact: {} <{}>", link.description, link.url);
            }
            if !offer.linked_store_ids.is_empty() {
                println!("  also at: {}", offer.linked_store_ids.join(", "));
            }
        }
        Commands::Serve => {
            offerdeck_web::serve_from_env().await?;
        }
    }

    Ok(())
}

fn load_board(path: &Path) -> Result<OfferBoard> {
    let raw = load_catalog_fixture(path)?;
    let mut board = OfferBoard::new();
    board.load(normalize(&raw));
    Ok(board)
}

fn default_catalog_path() -> PathBuf {
    std::env::var("OFFERDECK_CATALOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(offerdeck_web::DEFAULT_CATALOG_PATH))
}
