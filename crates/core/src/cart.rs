//! Cart line items and the ordered cart state.
//!
//! `CartState` is the whole cart for a session. It is mutated only through
//! [`CartState::add`] and [`CartState::remove`] and is persisted as a single
//! JSON snapshot. The snapshot keeps the field names used by the browser
//! storefront (`currentSlug`, `price` as a number) so existing stored carts
//! hydrate unchanged.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::types::{ImageReference, Price, ProductSlug, ProductSummary};

/// A persisted snapshot could not be encoded or decoded.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid cart snapshot: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode cart snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// One distinct product held in the cart.
///
/// Descriptive fields are a snapshot taken when the product was first added
/// and are not refreshed by later adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "currentSlug")]
    pub slug: ProductSlug,
    pub name: String,
    #[serde(default)]
    pub code: String,
    /// Stored as a JSON number, so precision is that of an `f64` (about 15
    /// significant digits). Catalog prices arrive as `f64` in the first place.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageReference>,
    pub quantity: NonZeroU32,
}

impl LineItem {
    fn from_product(product: &ProductSummary) -> Self {
        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            code: product.code.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: NonZeroU32::MIN,
        }
    }

    /// Unit price in the default currency.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::from_amount(self.price)
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::from_amount(
            self.price
                .saturating_mul(Decimal::from(self.quantity.get())),
        )
    }
}

/// Result of [`CartState::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line item was appended with quantity 1.
    Added,
    /// An existing line item's quantity was incremented.
    Incremented { quantity: NonZeroU32 },
}

/// Ordered collection of line items, at most one per identity.
///
/// New items are appended; incrementing an item keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    items: Vec<LineItem>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from stored line items.
    ///
    /// Items sharing an identity are merged into the first occurrence with
    /// their quantities summed, keeping the first occurrence's snapshot.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut merged: Vec<LineItem> = Vec::new();
        for item in items {
            match merged.iter_mut().find(|existing| existing.slug == item.slug) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity.get());
                }
                None => merged.push(item),
            }
        }
        Self { items: merged }
    }

    /// Add one unit of `product`.
    ///
    /// An existing line item for the same identity has its quantity bumped and
    /// keeps its original name, price and image. Otherwise a new line item is
    /// appended with quantity 1.
    pub fn add(&mut self, product: &ProductSummary) -> AddOutcome {
        if let Some(existing) = self.items.iter_mut().find(|item| item.slug == product.slug) {
            existing.quantity = existing.quantity.saturating_add(1);
            return AddOutcome::Incremented {
                quantity: existing.quantity,
            };
        }

        self.items.push(LineItem::from_product(product));
        AddOutcome::Added
    }

    /// Remove the line item for `slug`. Absent identities are a no-op.
    pub fn remove(&mut self, slug: &ProductSlug) -> Option<LineItem> {
        let index = self.items.iter().position(|item| &item.slug == slug)?;
        Some(self.items.remove(index))
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, slug: &ProductSlug) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.slug == slug)
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all line items.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, item| total.saturating_add(item.quantity.get()))
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        Price::from_amount(
            self.items
                .iter()
                .fold(Decimal::ZERO, |total, item| {
                    total.saturating_add(item.line_total().amount)
                }),
        )
    }

    /// Encode the whole cart as a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Encode` if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        serde_json::to_vec(self).map_err(SnapshotError::Encode)
    }

    /// Decode a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Decode` for malformed JSON, empty identities or
    /// zero quantities.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        serde_json::from_slice(bytes).map_err(SnapshotError::Decode)
    }
}

impl Serialize for CartState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CartState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<LineItem>::deserialize(deserializer).map(Self::from_items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(slug: &str, name: &str, price: i64) -> ProductSummary {
        ProductSummary {
            slug: ProductSlug::parse(slug).unwrap(),
            name: name.to_string(),
            code: format!("Y{slug}"),
            price: Decimal::new(price, 0),
            image: Some(ImageReference::from_asset_ref(format!(
                "image-{slug}-10x10-png"
            ))),
            position: 0,
        }
    }

    fn slug(value: &str) -> ProductSlug {
        ProductSlug::parse(value).unwrap()
    }

    fn quantities(cart: &CartState) -> Vec<(&str, u32)> {
        cart.items()
            .iter()
            .map(|item| (item.slug.as_str(), item.quantity.get()))
            .collect()
    }

    #[test]
    fn test_add_remove_scenario() {
        let mut cart = CartState::new();

        assert_eq!(cart.add(&product("A", "Chair", 10)), AddOutcome::Added);
        assert_eq!(quantities(&cart), vec![("A", 1)]);

        assert_eq!(
            cart.add(&product("A", "Chair", 10)),
            AddOutcome::Incremented {
                quantity: NonZeroU32::new(2).unwrap()
            }
        );
        assert_eq!(quantities(&cart), vec![("A", 2)]);

        assert_eq!(cart.add(&product("B", "Lamp", 5)), AddOutcome::Added);
        assert_eq!(quantities(&cart), vec![("A", 2), ("B", 1)]);

        assert!(cart.remove(&slug("A")).is_some());
        assert_eq!(quantities(&cart), vec![("B", 1)]);
    }

    #[test]
    fn test_repeat_add_keeps_first_snapshot() {
        let mut cart = CartState::new();
        cart.add(&product("A", "Chair", 10));
        for _ in 0..4 {
            cart.add(&product("A", "Renamed Chair", 99));
        }

        let item = cart.get(&slug("A")).unwrap();
        assert_eq!(item.quantity.get(), 5);
        assert_eq!(item.name, "Chair");
        assert_eq!(item.price, Decimal::new(10, 0));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_identity_uniqueness() {
        let mut cart = CartState::new();
        for key in ["a", "b", "a", "c", "b", "a"] {
            cart.add(&product(key, key, 1));
        }
        assert_eq!(quantities(&cart), vec![("a", 3), ("b", 2), ("c", 1)]);
    }

    #[test]
    fn test_increment_keeps_position() {
        let mut cart = CartState::new();
        cart.add(&product("a", "a", 1));
        cart.add(&product("b", "b", 1));
        cart.add(&product("a", "a", 1));
        assert_eq!(quantities(&cart), vec![("a", 2), ("b", 1)]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = CartState::new();
        cart.add(&product("a", "a", 1));
        cart.add(&product("b", "b", 1));

        assert!(cart.remove(&slug("a")).is_some());
        let once = cart.clone();
        assert!(cart.remove(&slug("a")).is_none());
        assert_eq!(cart, once);
    }

    #[test]
    fn test_remove_on_empty_cart() {
        let mut cart = CartState::new();
        assert!(cart.remove(&slug("missing")).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut cart = CartState::new();
        cart.add(&product("a", "a", 10));
        cart.add(&product("a", "a", 10));
        cart.add(&product("b", "b", 5));

        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal().display(), "$25.00");
        assert_eq!(cart.items()[0].line_total().display(), "$20.00");
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut cart = CartState::new();
        cart.add(&product("a", "Chair", 10));
        cart.add(&product("b", "Lamp", 5));
        cart.add(&product("a", "Chair", 10));

        let bytes = cart.to_bytes().unwrap();
        assert_eq!(CartState::from_bytes(&bytes).unwrap(), cart);
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let mut cart = CartState::new();
        cart.add(&ProductSummary {
            image: None,
            ..product("desk", "Desk", 120)
        });

        let value: serde_json::Value = serde_json::from_slice(&cart.to_bytes().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "currentSlug": "desk",
                "name": "Desk",
                "code": "Ydesk",
                "price": 120.0,
                "quantity": 1
            }])
        );
    }

    #[test]
    fn test_hydrates_browser_snapshot() {
        let stored = r#"[
            {"currentSlug":"chair","name":"Chair","code":"Y523201","price":42.5,
             "image":{"_type":"image","asset":{"_ref":"image-abc-10x10-png","_type":"reference"}},
             "quantity":3,"id":"Y523201"}
        ]"#;
        let cart = CartState::from_bytes(stored.as_bytes()).unwrap();
        let item = cart.get(&slug("chair")).unwrap();
        assert_eq!(item.quantity.get(), 3);
        assert_eq!(item.price, Decimal::new(425, 1));
        assert!(item.image.is_some());
    }

    #[test]
    fn test_hydration_merges_duplicates() {
        let stored = r#"[
            {"currentSlug":"a","name":"First","price":1,"quantity":2},
            {"currentSlug":"b","name":"B","price":1,"quantity":1},
            {"currentSlug":"a","name":"Second","price":9,"quantity":3}
        ]"#;
        let cart = CartState::from_bytes(stored.as_bytes()).unwrap();
        assert_eq!(quantities(&cart), vec![("a", 5), ("b", 1)]);
        assert_eq!(cart.get(&slug("a")).unwrap().name, "First");
    }

    #[test]
    fn test_quantity_saturates_at_max() {
        let json = r#"[
            {"currentSlug": "chair", "name": "Chair", "code": "C1", "price": 10, "quantity": 4294967295},
            {"currentSlug": "chair", "name": "Chair", "code": "C1", "price": 10, "quantity": 3}
        ]"#;
        let mut cart = CartState::from_bytes(json.as_bytes()).unwrap();
        assert_eq!(quantities(&cart), vec![("chair", u32::MAX)]);

        assert_eq!(
            cart.add(&product("chair", "Chair", 10)),
            AddOutcome::Incremented {
                quantity: NonZeroU32::MAX
            }
        );
        assert_eq!(cart.total_quantity(), u32::MAX);
    }

    #[test]
    fn test_rejects_invalid_snapshots() {
        for stored in [
            "not json",
            "{}",
            r#"[{"currentSlug":"","name":"x","price":1,"quantity":1}]"#,
            r#"[{"currentSlug":"a","name":"x","price":1,"quantity":0}]"#,
            r#"[{"name":"x","price":1,"quantity":1}]"#,
        ] {
            assert!(
                matches!(
                    CartState::from_bytes(stored.as_bytes()),
                    Err(SnapshotError::Decode(_))
                ),
                "{stored} should be rejected"
            );
        }
    }
}
