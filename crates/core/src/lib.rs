//! TrendCart Core - Shared domain types and the cart mutation engine.
//!
//! This crate provides the types shared by every TrendCart component:
//! - `storefront` - Public storefront serving the trending carousel and cart
//! - `cli` - Command-line tools for inspecting the persisted cart and catalog
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! durable storage, no HTTP clients. Persistence and scheduling live in the
//! storefront crate, which drives [`cart::CartState`] through its two
//! mutation entry points.
//!
//! # Modules
//!
//! - [`types`] - Identity newtypes, prices, image references, product summaries
//! - [`cart`] - Line items, the ordered cart state, and its snapshot codec

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{AddOutcome, CartState, LineItem, SnapshotError};
pub use types::*;
