//! Catalog inspection commands.
//!
//! # Usage
//!
//! ```bash
//! # List the current trending products
//! tc-cli catalog trending
//! ```
//!
//! # Environment Variables
//!
//! - `SANITY_PROJECT_ID` - Content source project ID (plus the optional
//!   `SANITY_*` variables the storefront reads)

use std::fmt::Write;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use trendcart_core::ProductSummary;
use trendcart_storefront::{
    catalog::{CatalogError, CatalogLoader},
    config::{ConfigError, StorefrontConfig},
    sanity::SanityClient,
};

/// Errors that can occur while reading the catalog.
#[derive(Debug, Error)]
pub enum CatalogCommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The trending query failed or returned nothing.
    #[error("{}", .0.user_message())]
    Catalog(#[from] CatalogError),
}

/// Load the trending catalog once with the storefront configuration.
///
/// # Errors
///
/// Returns an error if configuration is missing or the catalog is unavailable.
pub async fn load() -> Result<Arc<[ProductSummary]>, CatalogCommandError> {
    let config = StorefrontConfig::from_env()?;
    let loader = CatalogLoader::new(Arc::new(SanityClient::new(&config.sanity)));

    tracing::info!(dataset = %config.sanity.dataset, "Fetching trending products...");
    Ok(loader.load(&CancellationToken::new()).await?)
}

/// Print the trending products in carousel order.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub async fn trending() -> Result<(), CatalogCommandError> {
    let products = load().await?;

    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(&products));
    }
    Ok(())
}

/// One line per product: position, slug, name, code, price.
fn render(products: &[ProductSummary]) -> String {
    let mut out = String::new();
    for product in products {
        let _ = writeln!(
            out,
            "{:>3}. {:<24} {:<32} {:<10} {}",
            product.position + 1,
            product.slug,
            product.name,
            product.code,
            product.unit_price()
        );
    }
    out
}
