//! Product summaries produced by the catalog.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ImageReference, Price, ProductSlug};

/// A trending product as listed by the content source.
///
/// Immutable once fetched. A catalog fetch replaces the whole sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Cart identity.
    pub slug: ProductSlug,
    pub name: String,
    /// Merchant product code shown on the card.
    pub code: String,
    pub price: Decimal,
    pub image: Option<ImageReference>,
    /// Zero-based position in the source ordering (newest first).
    pub position: usize,
}

impl ProductSummary {
    /// Price in the default currency.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::from_amount(self.price)
    }
}
