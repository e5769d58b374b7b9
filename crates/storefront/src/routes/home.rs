//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;
use trendcart_core::ProductSummary;

use crate::catalog::CatalogStatus;
use crate::filters;
use crate::state::AppState;

/// Pixel size of carousel card images.
const CARD_IMAGE_SIZE: u32 = 178;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub slug: String,
    pub name: String,
    pub code: String,
    pub price: String,
    pub image_url: Option<String>,
}

impl ProductCardView {
    /// Build a card, resolving the image at `image_size` pixels square.
    #[must_use]
    pub fn new(state: &AppState, product: &ProductSummary, image_size: u32) -> Self {
        Self {
            slug: product.slug.to_string(),
            name: product.name.clone(),
            code: product.code.clone(),
            price: product.unit_price().display(),
            image_url: state.image_url(product.image.as_ref(), image_size, image_size),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub loading: bool,
    /// Empty unless the catalog failed to load.
    pub error_message: String,
    pub products: Vec<ProductCardView>,
    pub cart_count: u32,
}

/// Display the home page with the trending carousel.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let mut page = HomeTemplate {
        loading: false,
        error_message: String::new(),
        products: Vec::new(),
        cart_count: state.cart().read().total_quantity(),
    };

    match state.catalog().status() {
        CatalogStatus::Loading => page.loading = true,
        CatalogStatus::Error(err) => page.error_message = err.user_message().to_string(),
        CatalogStatus::Ready(products) => {
            page.products = products
                .iter()
                .map(|product| ProductCardView::new(&state, product, CARD_IMAGE_SIZE))
                .collect();
        }
    }

    page
}
