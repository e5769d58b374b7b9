//! TrendCart Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused by the binary and the CLI.
//!
//! # Components
//!
//! - [`catalog::CatalogLoader`] fetches the trending products once and
//!   publishes `Loading` / `Error` / `Ready` through a watch channel.
//! - [`cart::CartStore`] owns the session cart and writes every mutation
//!   through to a [`persistence::DurableStore`].
//! - [`routes`] renders both with Askama templates and HTMX fragments.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod persistence;
pub mod routes;
pub mod sanity;
pub mod session;
pub mod state;
