//! TrendCart CLI - cart and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Show the stored cart
//! tc-cli cart show
//!
//! # Add a trending product by slug
//! tc-cli cart add modern-chair
//!
//! # Remove a product
//! tc-cli cart remove modern-chair
//!
//! # Delete the stored snapshot
//! tc-cli cart clear
//!
//! # List trending products
//! tc-cli catalog trending
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and edit the persisted cart
//! - `catalog trending` - Fetch the trending catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use trendcart_storefront::session::CartKeying;

mod commands;

use commands::cart::CartTarget;

#[derive(Parser)]
#[command(name = "tc-cli")]
#[command(author, version, about = "TrendCart CLI tools")]
struct Cli {
    /// Directory of the durable cart store
    #[arg(long, env = "STOREFRONT_DATA_DIR", default_value = ".trendcart", global = true)]
    data_dir: PathBuf,

    /// Cart keying (`shared` or `per-customer`)
    #[arg(long, env = "STOREFRONT_CART_KEYING", default_value = "shared", global = true)]
    keying: CartKeying,

    /// Act as this signed-in customer
    #[arg(long, global = true)]
    customer: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit the persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Query the content source
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print line items and subtotal
    Show,
    /// Add one unit of a trending product
    Add {
        /// Product slug
        slug: String,
    },
    /// Remove a product's line item
    Remove {
        /// Product slug
        slug: String,
    },
    /// Delete the stored snapshot
    Clear,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List trending products in carousel order
    Trending,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let target = CartTarget {
        data_dir: cli.data_dir,
        keying: cli.keying,
        customer: cli.customer,
    };

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&target)?,
            CartAction::Add { slug } => commands::cart::add(&target, &slug).await?,
            CartAction::Remove { slug } => commands::cart::remove(&target, &slug)?,
            CartAction::Clear => commands::cart::clear(&target)?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Trending => commands::catalog::trending().await?,
        },
    }
    Ok(())
}
