//! Cart inspection and maintenance commands.
//!
//! These operate on the same durable store as the storefront, so a running
//! server and the CLI see each other's snapshots (last writer wins).
//!
//! # Usage
//!
//! ```bash
//! # Show the shared cart
//! tc-cli cart show
//!
//! # Add one unit of a trending product (fetches the catalog)
//! tc-cli cart add modern-chair
//!
//! # Work on a signed-in customer's cart (per-customer keying)
//! tc-cli --keying per-customer --customer cust_42 cart show
//!
//! # Drop the stored snapshot
//! tc-cli cart clear
//! ```

use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use trendcart_core::{AddOutcome, CartState, CustomerId, IdentityError, ProductSlug};
use trendcart_storefront::{
    cart::CartStore,
    persistence::{FileStore, StoreError},
    session::{CartKeying, SessionSignal},
};

use super::catalog::{self, CatalogCommandError};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// Durable store could not be opened or written.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Empty slug or customer id.
    #[error("{0}")]
    Identity(#[from] IdentityError),

    /// Catalog could not be read.
    #[error(transparent)]
    Catalog(#[from] CatalogCommandError),

    /// Slug is not in the trending catalog.
    #[error("Product not in the trending catalog: {0}")]
    UnknownProduct(String),
}

/// Where the cart lives and whose cart it is.
#[derive(Debug, Clone)]
pub struct CartTarget {
    pub data_dir: PathBuf,
    pub keying: CartKeying,
    pub customer: Option<String>,
}

impl CartTarget {
    fn signal(&self) -> Result<SessionSignal, IdentityError> {
        Ok(match &self.customer {
            Some(id) => SessionSignal::SignedIn(CustomerId::parse(id)?),
            None => SessionSignal::SignedOut,
        })
    }

    /// Open the durable store and hydrate the cart for this target.
    fn open(&self) -> Result<(FileStore, CartStore), CartCommandError> {
        let signal = self.signal()?;
        let durable = FileStore::open(&self.data_dir)?;
        let cart = CartStore::new(Arc::new(durable.clone()), self.keying);
        cart.activate(signal);
        Ok((durable, cart))
    }
}

/// Print the stored cart.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn show(target: &CartTarget) -> Result<(), CartCommandError> {
    let (_, cart) = target.open()?;
    print_cart(&cart);
    Ok(())
}

/// Add one unit of a trending product.
///
/// # Errors
///
/// Returns an error if the slug is empty, the catalog is unavailable, or the
/// product is not in it.
pub async fn add(target: &CartTarget, slug: &str) -> Result<(), CartCommandError> {
    let slug = ProductSlug::parse(slug)?;
    let (_, cart) = target.open()?;

    let products = catalog::load().await?;
    let product = products
        .iter()
        .find(|p| p.slug == slug)
        .ok_or_else(|| CartCommandError::UnknownProduct(slug.to_string()))?;

    match cart.add(product) {
        AddOutcome::Added => tracing::info!("{} added to cart!", product.name),
        AddOutcome::Incremented { quantity } => {
            tracing::info!("{} added to cart! (now {quantity})", product.name);
        }
    }
    print_cart(&cart);
    Ok(())
}

/// Remove a line item. Removing an absent item is not an error.
///
/// # Errors
///
/// Returns an error if the slug is empty or the store cannot be opened.
pub fn remove(target: &CartTarget, slug: &str) -> Result<(), CartCommandError> {
    let slug = ProductSlug::parse(slug)?;
    let (_, cart) = target.open()?;

    if !cart.remove(&slug) {
        tracing::info!("{slug} is not in the cart");
    }
    print_cart(&cart);
    Ok(())
}

/// Delete the stored snapshot for this target.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be removed.
pub fn clear(target: &CartTarget) -> Result<(), CartCommandError> {
    let (durable, cart) = target.open()?;
    let Some(key) = cart.storage_key() else {
        tracing::info!("No stored cart");
        return Ok(());
    };

    if durable.remove(&key)? {
        tracing::info!(key = %key, "Cart cleared");
    } else {
        tracing::info!(key = %key, "No stored cart");
    }
    Ok(())
}

fn print_cart(cart: &CartStore) {
    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(&cart.read()));
    }
}

/// Line items in insertion order followed by the totals.
fn render(cart: &CartState) -> String {
    if cart.is_empty() {
        return "Cart is empty.\n".to_string();
    }

    let mut out = String::new();
    for item in cart.items() {
        let _ = writeln!(
            out,
            "{:<24} {:<32} {:>4} x {:>10} = {}",
            item.slug,
            item.name,
            item.quantity,
            item.unit_price(),
            item.line_total()
        );
    }
    let _ = writeln!(
        out,
        "{} item(s), subtotal {}",
        cart.total_quantity(),
        cart.subtotal()
    );
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use tempfile::TempDir;
    use trendcart_core::ProductSummary;

    use super::*;

    fn product(slug: &str, name: &str, price: i64) -> ProductSummary {
        ProductSummary {
            slug: ProductSlug::parse(slug).unwrap(),
            name: name.to_string(),
            code: format!("C-{slug}"),
            price: Decimal::new(price, 0),
            image: None,
            position: 0,
        }
    }

    fn target(dir: &TempDir, keying: CartKeying, customer: Option<&str>) -> CartTarget {
        CartTarget {
            data_dir: dir.path().to_path_buf(),
            keying,
            customer: customer.map(ToString::to_string),
        }
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&CartState::new()), "Cart is empty.\n");
    }

    #[test]
    fn test_render_totals() {
        let mut cart = CartState::new();
        cart.add(&product("chair", "Chair", 10));
        cart.add(&product("chair", "Chair", 10));
        cart.add(&product("lamp", "Lamp", 5));

        let out = render(&cart);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("chair"));
        assert!(lines[0].ends_with("$20.00"));
        assert_eq!(lines[2], "3 item(s), subtotal $25.00");
    }

    #[test]
    fn test_remove_and_clear() {
        let dir = TempDir::new().unwrap();
        let shared = target(&dir, CartKeying::Shared, None);

        let (_, cart) = shared.open().unwrap();
        cart.add(&product("chair", "Chair", 10));

        remove(&shared, "lamp").unwrap();
        assert_eq!(shared.open().unwrap().1.read().len(), 1);

        clear(&shared).unwrap();
        assert!(shared.open().unwrap().1.read().is_empty());
    }

    #[test]
    fn test_customer_targets_are_isolated_per_customer() {
        let dir = TempDir::new().unwrap();
        let alice = target(&dir, CartKeying::PerCustomer, Some("alice"));
        let guest = target(&dir, CartKeying::PerCustomer, None);

        alice.open().unwrap().1.add(&product("chair", "Chair", 10));

        assert_eq!(alice.open().unwrap().1.read().len(), 1);
        assert!(guest.open().unwrap().1.read().is_empty());
    }

    #[test]
    fn test_email_customer_cart_persists() {
        let dir = TempDir::new().unwrap();
        let alice = target(&dir, CartKeying::PerCustomer, Some("alice@example.com"));

        alice.open().unwrap().1.add(&product("chair", "Chair", 10));
        assert_eq!(alice.open().unwrap().1.read().len(), 1);

        clear(&alice).unwrap();
        assert!(alice.open().unwrap().1.read().is_empty());
    }

    #[test]
    fn test_empty_customer_rejected() {
        let dir = TempDir::new().unwrap();
        let blank = target(&dir, CartKeying::PerCustomer, Some("  "));
        assert!(matches!(blank.open(), Err(CartCommandError::Identity(_))));
    }

    #[test]
    fn test_empty_slug_rejected() {
        let dir = TempDir::new().unwrap();
        let shared = target(&dir, CartKeying::Shared, None);
        assert!(matches!(
            remove(&shared, ""),
            Err(CartCommandError::Identity(_))
        ));
    }
}
