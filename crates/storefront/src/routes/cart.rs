//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every handler goes through the shared [`CartStore`](crate::cart::CartStore);
//! nothing here touches the cart state directly.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;
use trendcart_core::{CartState, LineItem, ProductSlug};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::routes::find_product;
use crate::state::AppState;

/// Pixel size of cart line images.
const LINE_IMAGE_SIZE: u32 = 96;

/// HTMX event fired after the cart changes.
const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub slug: String,
    pub name: String,
    pub code: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartItemView {
    fn new(state: &AppState, item: &LineItem) -> Self {
        Self {
            slug: item.slug.to_string(),
            name: item.name.clone(),
            code: item.code.clone(),
            quantity: item.quantity.get(),
            price: item.unit_price().display(),
            line_price: item.line_total().display(),
            image_url: state.image_url(item.image.as_ref(), LINE_IMAGE_SIZE, LINE_IMAGE_SIZE),
        }
    }
}

impl CartView {
    fn new(state: &AppState, cart: &CartState) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView::new(state, item))
                .collect(),
            subtotal: cart.subtotal().display(),
            item_count: cart.total_quantity(),
        }
    }
}

/// Add/remove form data.
#[derive(Debug, Deserialize)]
pub struct CartForm {
    #[serde(default)]
    pub slug: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub cart_count: u32,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// "Added to cart" popup fragment. Renders nothing when `message` is empty.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_popup.html")]
pub struct CartPopupTemplate {
    pub message: String,
}

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> CartShowTemplate {
    let cart = state.cart().read();
    CartShowTemplate {
        cart_count: cart.total_quantity(),
        cart: CartView::new(&state, &cart),
    }
}

/// Add one unit of a catalog product (HTMX).
///
/// Returns the popup fragment and an HTMX trigger to refresh the badge.
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<CartForm>) -> Result<Response> {
    let slug = ProductSlug::parse(&form.slug)?;
    let product = find_product(&state, &slug)?;

    state.cart().add(&product);
    add_breadcrumb("cart", "Added to cart", Some(&[("slug", slug.as_str())]));

    let message = state.cart().notification().unwrap_or_default();
    Ok((AppendHeaders([CART_UPDATED]), CartPopupTemplate { message }).into_response())
}

/// Remove a line item (HTMX). Removing an absent item is not an error.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<CartForm>,
) -> Result<Response> {
    let slug = ProductSlug::parse(&form.slug)?;
    state.cart().remove(&slug);

    let cart = CartView::new(&state, &state.cart().read());
    Ok((AppendHeaders([CART_UPDATED]), CartItemsTemplate { cart }).into_response())
}

/// Cart count badge (HTMX).
pub async fn count(State(state): State<AppState>) -> CartCountTemplate {
    CartCountTemplate {
        count: state.cart().read().total_quantity(),
    }
}

/// Current popup, empty once the notice expired (HTMX).
pub async fn notification(State(state): State<AppState>) -> CartPopupTemplate {
    CartPopupTemplate {
        message: state.cart().notification().unwrap_or_default(),
    }
}

/// Close the popup early (HTMX).
pub async fn dismiss(State(state): State<AppState>) -> CartPopupTemplate {
    state.cart().dismiss_notification();
    CartPopupTemplate {
        message: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::{app, get, post_form, product, state};

    fn catalog() -> Vec<trendcart_core::ProductSummary> {
        vec![product("chair", "Chair", 10), product("lamp", "Lamp", 5)]
    }

    #[tokio::test]
    async fn test_add_shows_popup_and_updates_cart() {
        let state = state(Some(catalog())).await;

        let (status, body) = post_form(app(state.clone()), "/cart/add", "slug=chair").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Chair added to cart!"));

        post_form(app(state.clone()), "/cart/add", "slug=chair").await;
        post_form(app(state.clone()), "/cart/add", "slug=lamp").await;

        let (_, count) = get(app(state.clone()), "/cart/count").await;
        assert!(count.contains(">3<"));

        let (status, page) = get(app(state), "/cart").await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("$25.00"));
        let chair = page.find("Chair");
        let lamp = page.find("Lamp");
        assert!(chair.is_some() && chair < lamp);
    }

    #[tokio::test]
    async fn test_add_rejects_empty_slug() {
        let state = state(Some(catalog())).await;
        let (status, _) = post_form(app(state.clone()), "/cart/add", "slug=+++").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_form(app(state.clone()), "/cart/add", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.cart().read().is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let state = state(Some(catalog())).await;
        let (status, _) = post_form(app(state.clone()), "/cart/add", "slug=sofa").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(state.cart().read().is_empty());
    }

    #[tokio::test]
    async fn test_add_while_catalog_failed() {
        let state = state(Some(vec![])).await;
        let (status, body) = post_form(app(state.clone()), "/cart/add", "slug=chair").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, "No products found.");
        assert!(state.cart().read().is_empty());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let state = state(Some(catalog())).await;
        post_form(app(state.clone()), "/cart/add", "slug=chair").await;
        post_form(app(state.clone()), "/cart/add", "slug=lamp").await;

        let (status, first) = post_form(app(state.clone()), "/cart/remove", "slug=chair").await;
        assert_eq!(status, StatusCode::OK);
        let (status, second) = post_form(app(state.clone()), "/cart/remove", "slug=chair").await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(first, second);
        assert!(!second.contains("Chair"));
        assert_eq!(state.cart().read().len(), 1);
    }

    #[tokio::test]
    async fn test_dismiss_clears_popup() {
        let state = state(Some(catalog())).await;
        post_form(app(state.clone()), "/cart/add", "slug=lamp").await;

        let (_, popup) = get(app(state.clone()), "/cart/notification").await;
        assert!(popup.contains("Lamp added to cart!"));

        post_form(app(state.clone()), "/cart/notification/dismiss", "").await;
        let (_, popup) = get(app(state), "/cart/notification").await;
        assert!(popup.trim().is_empty());
    }
}
