//! Session identity signal and cart storage keying.
//!
//! The auth provider reports whether a customer is signed in. With the
//! default [`CartKeying::Shared`] the signal only decides when the cart
//! hydrates: signed-in and signed-out sessions share one storage key, the
//! same behaviour as the browser storefront. [`CartKeying::PerCustomer`]
//! keeps a separate snapshot per signed-in customer.

use std::fmt::{self, Write};
use std::str::FromStr;

use thiserror::Error;
use trendcart_core::CustomerId;

/// Storage key of the shared cart snapshot.
pub const CART_KEY: &str = "cartItems";

/// Authentication state reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionSignal {
    /// The provider has not answered yet.
    #[default]
    Unknown,
    SignedIn(CustomerId),
    SignedOut,
}

/// How cart snapshots are keyed in the durable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartKeying {
    /// One snapshot under [`CART_KEY`] regardless of the signal.
    #[default]
    Shared,
    /// Signed-in customers get `cartItems:<customer id>`.
    PerCustomer,
}

/// Unrecognised `CartKeying` name.
#[derive(Debug, Error)]
#[error("unknown cart keying '{0}', expected 'shared' or 'per-customer'")]
pub struct KeyingParseError(String);

impl CartKeying {
    /// Storage key for `signal`.
    ///
    /// Returns `None` while the key cannot be decided yet, in which case the
    /// store defers hydration.
    #[must_use]
    pub fn storage_key(self, signal: &SessionSignal) -> Option<String> {
        match (self, signal) {
            (Self::Shared, _) | (Self::PerCustomer, SessionSignal::SignedOut) => {
                Some(CART_KEY.to_string())
            }
            (Self::PerCustomer, SessionSignal::Unknown) => None,
            (Self::PerCustomer, SessionSignal::SignedIn(customer)) => {
                Some(format!("{CART_KEY}:{}", escape_key_segment(customer.as_str())))
            }
        }
    }
}

/// Escape a customer id into the durable store's key alphabet.
///
/// ASCII letters, digits, `.` and `-` pass through; every other byte,
/// `_` included, becomes `_XX` (upper-case hex), so distinct ids never share
/// a key.
fn escape_key_segment(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-') {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "_{byte:02X}");
        }
    }
    out
}

impl FromStr for CartKeying {
    type Err = KeyingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(Self::Shared),
            "per-customer" | "per_customer" => Ok(Self::PerCustomer),
            other => Err(KeyingParseError(other.to_string())),
        }
    }
}

impl fmt::Display for CartKeying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shared => "shared",
            Self::PerCustomer => "per-customer",
        })
    }
}
