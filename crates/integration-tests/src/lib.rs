//! Integration tests for TrendCart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p trendcart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart behaviour through the durable file store
//! - `catalog_loader` - Catalog status transitions against stub sources
//! - `notifications` - Popup timing under paused time
//!
//! The suites need no network: catalog sources are in-process stubs and the
//! durable store lives in a temporary directory.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tempfile::TempDir;
use trendcart_core::{ImageReference, ProductSlug, ProductSummary};
use trendcart_storefront::{
    cart::CartStore,
    catalog::CatalogSource,
    persistence::FileStore,
    sanity::SanityError,
    session::{CartKeying, SessionSignal},
};

/// Catalog product with a whole-unit price.
#[must_use]
pub fn product(slug: &str, name: &str, price: i64) -> ProductSummary {
    ProductSummary {
        slug: ProductSlug::parse(slug).unwrap(),
        name: name.to_string(),
        code: format!("Y-{slug}"),
        price: Decimal::new(price, 0),
        image: Some(ImageReference::from_asset_ref(format!(
            "image-{slug}-800x600-jpg"
        ))),
        position: 0,
    }
}

#[must_use]
pub fn slug(value: &str) -> ProductSlug {
    ProductSlug::parse(value).unwrap()
}

/// A durable store in a temporary directory that outlives individual
/// [`CartStore`]s, standing in for a process restart.
pub struct Storage {
    dir: TempDir,
}

impl Storage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    #[must_use]
    pub fn file_store(&self) -> FileStore {
        FileStore::open(self.dir.path()).unwrap()
    }

    /// A freshly started cart store, already activated for `signal`.
    #[must_use]
    pub fn cart(&self, keying: CartKeying, signal: SessionSignal) -> CartStore {
        let cart = CartStore::new(Arc::new(self.file_store()), keying);
        cart.activate(signal);
        cart
    }

    /// A shared-keyed cart for a signed-out session.
    #[must_use]
    pub fn shared_cart(&self) -> CartStore {
        self.cart(CartKeying::Shared, SessionSignal::SignedOut)
    }

    /// Raw snapshot bytes under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        use trendcart_storefront::persistence::DurableStore;
        self.file_store().get(key).unwrap()
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

/// Source that answers each call with the next scripted response.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<ProductSummary>, SanityError>>>,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(responses: Vec<Result<Vec<ProductSummary>, SanityError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn trending_products(&self) -> Result<Arc<[ProductSummary]>, SanityError> {
        let next = self.responses.lock().unwrap().pop_front();
        next.map_or_else(|| Ok(Arc::from(Vec::new())), |r| r.map(Arc::from))
    }
}

/// Source that never answers.
pub struct PendingSource;

#[async_trait]
impl CatalogSource for PendingSource {
    async fn trending_products(&self) -> Result<Arc<[ProductSummary]>, SanityError> {
        std::future::pending().await
    }
}
