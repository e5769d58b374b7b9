//! Application state shared across handlers.

use std::sync::Arc;

use trendcart_core::ImageReference;

use crate::cart::CartStore;
use crate::catalog::CatalogLoader;
use crate::config::StorefrontConfig;
use crate::persistence::{FileStore, StoreError};
use crate::sanity::SanityClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It is the single owner of the
/// session cart and the catalog loader; handlers reach both through it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<CatalogLoader>,
    cart: CartStore,
}

impl AppState {
    /// Assemble state from already-built components.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Arc<CatalogLoader>, cart: CartStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
            }),
        }
    }

    /// Build the production components described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart data directory cannot be created.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StoreError> {
        let durable = FileStore::open(&config.data_dir)?;
        let cart = CartStore::new(Arc::new(durable), config.cart_keying);
        let catalog = Arc::new(CatalogLoader::new(Arc::new(SanityClient::new(
            &config.sanity,
        ))));

        Ok(Self::new(config, catalog, cart))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog loader.
    #[must_use]
    pub fn catalog(&self) -> &Arc<CatalogLoader> {
        &self.inner.catalog
    }

    /// Get a reference to the session cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Resolve a display URL for a catalog image.
    #[must_use]
    pub fn image_url(&self, image: Option<&ImageReference>, width: u32, height: u32) -> Option<String> {
        let sanity = &self.inner.config.sanity;
        image?.sized_url(&sanity.project_id, &sanity.dataset, width, height)
    }
}
