//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                            - Home page (trending carousel)
//! GET  /health                      - Health check
//!
//! # Products
//! GET  /products/{slug}             - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                        - Cart page
//! POST /cart/add                    - Add to cart (returns popup, triggers cart-updated)
//! POST /cart/remove                 - Remove item (returns cart_items fragment)
//! GET  /cart/count                  - Cart count badge (fragment)
//! GET  /cart/notification           - Popup while the notice is live (fragment)
//! POST /cart/notification/dismiss   - Close the popup
//! ```

pub mod cart;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use trendcart_core::{ProductSlug, ProductSummary};

use crate::catalog::CatalogStatus;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Look up a product in the loaded catalog.
///
/// A failed catalog answers `AppError::Catalog` (503); an unknown slug, or a
/// catalog still loading, answers `AppError::NotFound`.
fn find_product(state: &AppState, slug: &ProductSlug) -> Result<ProductSummary> {
    if let Some(product) = state.catalog().find(slug) {
        return Ok(product);
    }
    match state.catalog().status() {
        CatalogStatus::Error(err) => Err(AppError::Catalog(err)),
        CatalogStatus::Loading | CatalogStatus::Ready(_) => {
            Err(AppError::NotFound(format!("product {slug}")))
        }
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new().route("/{slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .route("/notification", get(cart::notification))
        .route("/notification/dismiss", post(cart::dismiss))
}

/// Create all storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
}
