//! Trending catalog loader.
//!
//! The loader runs one fetch per activation and publishes its progress as a
//! [`CatalogStatus`] that moves from `Loading` to either `Ready` or `Error`.
//! An empty result is an error ("No products found."), not an empty `Ready`.
//!
//! Only one fetch may be in flight; a concurrent `load` is rejected with
//! [`CatalogError::InFlight`]. A fetch can be cancelled through its
//! `CancellationToken`, in which case the result is discarded. There is no
//! retry and no timeout: a hung fetch leaves the status at `Loading`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use trendcart_core::{ProductSlug, ProductSummary};

use crate::sanity::{SanityClient, SanityError};

/// Anything that can list the trending products.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the trending products in source order.
    async fn trending_products(&self) -> Result<Arc<[ProductSummary]>, SanityError>;
}

#[async_trait]
impl CatalogSource for SanityClient {
    async fn trending_products(&self) -> Result<Arc<[ProductSummary]>, SanityError> {
        Self::trending_products(self).await
    }
}

/// Catalog load failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The source answered with zero products.
    #[error("no products found")]
    Empty,

    /// Transport or parse failure; details are logged, not kept.
    #[error("failed to fetch products: {0}")]
    Fetch(String),

    /// Another load is still running.
    #[error("a catalog load is already in flight")]
    InFlight,

    /// The load was cancelled before the source answered.
    #[error("catalog load cancelled")]
    Cancelled,
}

impl CatalogError {
    /// Static message shown in place of the carousel.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Empty => "No products found.",
            _ => "An error occurred while fetching products.",
        }
    }
}

/// Observable state of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Error(CatalogError),
    Ready(Arc<[ProductSummary]>),
}

/// Loads the trending catalog and publishes its status.
pub struct CatalogLoader {
    source: Arc<dyn CatalogSource>,
    status: watch::Sender<CatalogStatus>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a load finishes or its future is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CatalogLoader {
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        let (status, _) = watch::channel(CatalogStatus::Loading);
        Self {
            source,
            status,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> CatalogStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified on every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogStatus> {
        self.status.subscribe()
    }

    /// Look up a loaded product by slug.
    #[must_use]
    pub fn find(&self, slug: &ProductSlug) -> Option<ProductSummary> {
        match &*self.status.borrow() {
            CatalogStatus::Ready(products) => {
                products.iter().find(|product| &product.slug == slug).cloned()
            }
            _ => None,
        }
    }

    /// Fetch the catalog, replacing any previously loaded sequence.
    ///
    /// # Errors
    ///
    /// - `CatalogError::InFlight` if another load is running (status untouched)
    /// - `CatalogError::Cancelled` if `cancel` fired first (result discarded)
    /// - `CatalogError::Empty` / `CatalogError::Fetch`, also published as the
    ///   `Error` status
    #[instrument(skip_all)]
    pub async fn load(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[ProductSummary]>, CatalogError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("catalog load already in flight, ignoring");
            return Err(CatalogError::InFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        self.status.send_replace(CatalogStatus::Loading);

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("catalog load cancelled");
                return Err(CatalogError::Cancelled);
            }
            result = self.source.trending_products() => result,
        };

        match result {
            Ok(products) if products.is_empty() => {
                tracing::warn!("catalog source returned no products");
                self.status
                    .send_replace(CatalogStatus::Error(CatalogError::Empty));
                Err(CatalogError::Empty)
            }
            Ok(products) => {
                tracing::info!(count = products.len(), "trending catalog loaded");
                self.status
                    .send_replace(CatalogStatus::Ready(Arc::clone(&products)));
                Ok(products)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch trending products");
                let error = CatalogError::Fetch(e.to_string());
                self.status.send_replace(CatalogStatus::Error(error.clone()));
                Err(error)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use rust_decimal::Decimal;
    use tokio::sync::Notify;

    use super::*;

    fn product(slug: &str) -> ProductSummary {
        ProductSummary {
            slug: ProductSlug::parse(slug).unwrap(),
            name: slug.to_uppercase(),
            code: "Y1".to_string(),
            price: Decimal::TEN,
            image: None,
            position: 0,
        }
    }

    /// Source that replays queued responses.
    struct Scripted(Mutex<Vec<Result<Vec<ProductSummary>, SanityError>>>);

    impl Scripted {
        fn new(responses: Vec<Result<Vec<ProductSummary>, SanityError>>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(responses)))
        }
    }

    #[async_trait]
    impl CatalogSource for Scripted {
        async fn trending_products(&self) -> Result<Arc<[ProductSummary]>, SanityError> {
            self.0.lock().unwrap().remove(0).map(Into::into)
        }
    }

    /// Source that blocks until released.
    struct Gated(Notify);

    #[async_trait]
    impl CatalogSource for Gated {
        async fn trending_products(&self) -> Result<Arc<[ProductSummary]>, SanityError> {
            self.0.notified().await;
            Ok(vec![product("late")].into())
        }
    }

    fn bad_gateway() -> SanityError {
        SanityError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn test_ready_after_fetch() {
        let loader = CatalogLoader::new(Scripted::new(vec![Ok(vec![product("a"), product("b")])]));
        assert_eq!(loader.status(), CatalogStatus::Loading);

        let products = loader.load(&CancellationToken::new()).await.unwrap();
        assert_eq!(products.len(), 2);
        assert!(matches!(loader.status(), CatalogStatus::Ready(p) if p.len() == 2));
        assert!(loader.find(&ProductSlug::parse("b").unwrap()).is_some());
        assert!(loader.find(&ProductSlug::parse("z").unwrap()).is_none());
    }

    #[tokio::test]
    async fn test_empty_catalog_is_error() {
        let loader = CatalogLoader::new(Scripted::new(vec![Ok(vec![])]));
        let err = loader.load(&CancellationToken::new()).await.unwrap_err();

        assert_eq!(err, CatalogError::Empty);
        assert_eq!(loader.status(), CatalogStatus::Error(CatalogError::Empty));
        assert_eq!(err.user_message(), "No products found.");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_error() {
        let loader = CatalogLoader::new(Scripted::new(vec![Err(bad_gateway())]));
        let err = loader.load(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, CatalogError::Fetch(_)));
        assert!(matches!(loader.status(), CatalogStatus::Error(CatalogError::Fetch(_))));
        assert_eq!(err.user_message(), "An error occurred while fetching products.");
    }

    #[tokio::test]
    async fn test_reload_replaces_wholesale() {
        let loader = CatalogLoader::new(Scripted::new(vec![
            Ok(vec![product("a"), product("b")]),
            Ok(vec![product("c")]),
        ]));
        let cancel = CancellationToken::new();
        loader.load(&cancel).await.unwrap();
        loader.load(&cancel).await.unwrap();

        assert!(loader.find(&ProductSlug::parse("a").unwrap()).is_none());
        assert!(loader.find(&ProductSlug::parse("c").unwrap()).is_some());
    }

    #[tokio::test]
    async fn test_reentrant_load_rejected() {
        let source = Arc::new(Gated(Notify::new()));
        let loader = Arc::new(CatalogLoader::new(source.clone()));
        let cancel = CancellationToken::new();

        let first = tokio::spawn({
            let loader = Arc::clone(&loader);
            let cancel = cancel.clone();
            async move { loader.load(&cancel).await }
        });

        // Wait until the first load has claimed the in-flight slot
        while !loader.in_flight.load(Ordering::Acquire) {
            tokio::task::yield_now().await;
        }

        assert_eq!(loader.load(&cancel).await.unwrap_err(), CatalogError::InFlight);
        assert_eq!(loader.status(), CatalogStatus::Loading);

        source.0.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert!(!loader.in_flight.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_cancel_discards_result() {
        let loader = Arc::new(CatalogLoader::new(Arc::new(Gated(Notify::new()))));
        let cancel = CancellationToken::new();
        let mut status = loader.subscribe();

        let task = tokio::spawn({
            let loader = Arc::clone(&loader);
            let cancel = cancel.clone();
            async move { loader.load(&cancel).await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();

        assert_eq!(task.await.unwrap().unwrap_err(), CatalogError::Cancelled);
        assert_eq!(*status.borrow_and_update(), CatalogStatus::Loading);
        assert!(!loader.in_flight.load(Ordering::Acquire));
    }
}
