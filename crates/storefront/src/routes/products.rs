//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;
use trendcart_core::ProductSlug;

use crate::error::Result;
use crate::routes::find_product;
use crate::filters;
use crate::routes::home::ProductCardView;
use crate::state::AppState;

/// Pixel size of the detail page image.
const DETAIL_IMAGE_SIZE: u32 = 600;

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductCardView,
    pub cart_count: u32,
}

/// Display a product from the loaded catalog.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ProductShowTemplate> {
    let slug = ProductSlug::parse(&slug)?;
    let product = find_product(&state, &slug)?;

    Ok(ProductShowTemplate {
        product: ProductCardView::new(&state, &product, DETAIL_IMAGE_SIZE),
        cart_count: state.cart().read().total_quantity(),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::{app, get, product, state};

    #[tokio::test]
    async fn test_show_product() {
        let state = state(Some(vec![product("chair", "Cantilever Chair", 42)])).await;
        let (status, body) = get(app(state), "/products/chair").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Cantilever Chair"));
        assert!(body.contains("w=600"));
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let state = state(Some(vec![product("chair", "Cantilever Chair", 42)])).await;
        let (status, _) = get(app(state), "/products/sofa").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_product_while_catalog_failed() {
        let (status, body) = get(app(state(Some(vec![])).await), "/products/chair").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, "No products found.");
    }

    #[tokio::test]
    async fn test_product_while_loading() {
        let (status, _) = get(app(state(None).await), "/products/chair").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
