//! Wire types for content source query responses.

use rust_decimal::Decimal;
use serde::Deserialize;
use trendcart_core::{ImageReference, ProductSlug, ProductSummary};

/// Query API response envelope.
#[derive(Debug, Deserialize)]
pub struct QueryResponse<T> {
    pub result: T,
    /// Server-side query time in milliseconds.
    #[serde(default)]
    pub ms: Option<u64>,
}

/// One record returned by [`TRENDING_QUERY`](super::TRENDING_QUERY).
///
/// Every field is optional on the wire; documents in the content studio can
/// be saved half-filled.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<ImageReference>,
    #[serde(default)]
    pub current_slug: Option<String>,
}

/// Why a record was left out of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skipped {
    MissingSlug,
    MissingPrice,
}

impl TrendingRecord {
    /// Convert into a product summary at source position `position`.
    ///
    /// # Errors
    ///
    /// Records without a slug cannot be added to the cart and records without
    /// a price cannot be shown, so both are rejected.
    pub fn into_summary(self, position: usize) -> Result<ProductSummary, Skipped> {
        let slug = self
            .current_slug
            .as_deref()
            .and_then(|slug| ProductSlug::parse(slug).ok())
            .ok_or(Skipped::MissingSlug)?;
        let price = self.price.ok_or(Skipped::MissingPrice)?;

        Ok(ProductSummary {
            slug,
            name: self.name.unwrap_or_default(),
            code: self.code.unwrap_or_default(),
            price,
            image: self.image,
            position,
        })
    }
}

/// Convert raw records, dropping unusable ones with a warning.
#[must_use]
pub fn convert_trending(records: Vec<TrendingRecord>) -> Vec<ProductSummary> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| {
            let name = record.name.clone();
            record
                .into_summary(position)
                .map_err(|reason| {
                    tracing::warn!(position, ?name, ?reason, "skipping trending product record");
                })
                .ok()
        })
        .collect()
}
