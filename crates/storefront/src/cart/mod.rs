//! Session cart store.
//!
//! `CartStore` owns the session's [`CartState`] and is the only way to mutate
//! it. It is built once at startup and handed to consumers through
//! [`AppState`](crate::state::AppState); clones share the same cart.
//!
//! Every mutation writes the whole cart to the durable store under the active
//! key before the store lock is released, so snapshots land in mutation order.
//! Durable-store failures are logged and never reach the caller: a failed
//! read hydrates an empty cart, a failed write leaves the in-memory cart
//! authoritative until the next successful write. Until the first
//! activation decides a storage key nothing is written, so a cart mutated
//! early never overwrites a stored one.
//!
//! The server builds one `CartStore` per process, so every HTTP visitor
//! shares the same cart and the same popup. Per-visitor carts would need a
//! store per browser session.

mod notice;

pub use notice::{NOTICE_TTL, Notifier};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::instrument;
use trendcart_core::{AddOutcome, CartState, ProductSlug, ProductSummary};

use crate::persistence::DurableStore;
use crate::session::{CartKeying, SessionSignal};

/// Shared handle to the session cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    durable: Arc<dyn DurableStore>,
    keying: CartKeying,
    active: Mutex<ActiveCart>,
    notifier: Notifier,
}

struct ActiveCart {
    signal: SessionSignal,
    /// `None` until a session signal decides the storage key.
    key: Option<String>,
    cart: CartState,
}

impl CartStore {
    /// Create a store with an empty cart.
    ///
    /// Call [`CartStore::activate`] to hydrate from the durable store.
    #[must_use]
    pub fn new(durable: Arc<dyn DurableStore>, keying: CartKeying) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                durable,
                keying,
                active: Mutex::new(ActiveCart {
                    signal: SessionSignal::Unknown,
                    key: None,
                    cart: CartState::new(),
                }),
                notifier: Notifier::new(),
            }),
        }
    }

    /// Observe a session signal and hydrate the cart for it.
    ///
    /// Returns `false` when hydration is deferred because the storage key
    /// depends on a signal that is still unknown. Items added before the
    /// first hydration are held in memory and merged into the stored cart
    /// once the key is known.
    #[instrument(skip(self))]
    pub fn activate(&self, signal: SessionSignal) -> bool {
        let mut active = self.lock();
        let Some(key) = self.inner.keying.storage_key(&signal) else {
            tracing::debug!("session not determined yet, deferring cart hydration");
            active.signal = signal;
            return false;
        };

        let stored = self.hydrate(&key);
        let pending = active.key.is_none() && !active.cart.is_empty();
        let cart = if pending {
            CartState::from_items(stored.items().iter().chain(active.cart.items()).cloned())
        } else {
            stored
        };
        active.cart = cart;
        active.key = Some(key);
        active.signal = signal;
        if pending {
            self.persist(&active);
        }
        tracing::debug!(key = ?active.key, items = active.cart.len(), pending, "cart hydrated");
        true
    }

    /// Add one unit of `product` and announce it.
    #[instrument(skip(self, product), fields(slug = %product.slug))]
    pub fn add(&self, product: &ProductSummary) -> AddOutcome {
        let outcome = {
            let mut active = self.lock();
            let outcome = active.cart.add(product);
            self.persist(&active);
            outcome
        };

        tracing::debug!(?outcome, "added to cart");
        self.inner
            .notifier
            .post(format!("{} added to cart!", product.name));
        outcome
    }

    /// Remove the line item for `slug`. Returns whether anything was removed.
    #[instrument(skip(self))]
    pub fn remove(&self, slug: &ProductSlug) -> bool {
        let mut active = self.lock();
        if active.cart.remove(slug).is_none() {
            return false;
        }
        self.persist(&active);
        tracing::debug!("removed from cart");
        true
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn read(&self) -> CartState {
        self.lock().cart.clone()
    }

    /// The last observed session signal.
    #[must_use]
    pub fn signal(&self) -> SessionSignal {
        self.lock().signal.clone()
    }

    /// Key the cart is persisted under, `None` before the first hydration.
    #[must_use]
    pub fn storage_key(&self) -> Option<String> {
        self.lock().key.clone()
    }

    /// The visible "added to cart" message, if any.
    #[must_use]
    pub fn notification(&self) -> Option<String> {
        self.inner.notifier.current()
    }

    /// Close the notification popup early.
    pub fn dismiss_notification(&self) {
        self.inner.notifier.dismiss();
    }

    fn hydrate(&self, key: &str) -> CartState {
        let bytes = match self.inner.durable.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return CartState::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read stored cart, starting empty");
                return CartState::new();
            }
        };

        CartState::from_bytes(&bytes).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "discarding unreadable stored cart");
            CartState::new()
        })
    }

    fn persist(&self, active: &ActiveCart) {
        let Some(key) = active.key.as_deref() else {
            tracing::debug!("cart not hydrated yet, holding changes in memory");
            return;
        };

        let result = active
            .cart
            .to_bytes()
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                self.inner
                    .durable
                    .set(key, &bytes)
                    .map_err(|e| e.to_string())
            });

        if let Err(error) = result {
            tracing::warn!(key, %error, "failed to persist cart");
        }
    }

    fn lock(&self) -> MutexGuard<'_, ActiveCart> {
        self.inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
