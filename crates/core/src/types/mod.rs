//! Core types for TrendCart.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod id;
pub mod image;
pub mod price;
pub mod product;

pub use id::*;
pub use image::{ImageAsset, ImageReference};
pub use price::{CurrencyCode, Price};
pub use product::ProductSummary;
