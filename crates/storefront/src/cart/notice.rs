//! Transient "added to cart" notification.
//!
//! A posted notice stays visible for [`NOTICE_TTL`]. Posting again replaces
//! the message and restarts the window, so rapid adds show the newest message
//! for a full three seconds after the last click.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone)]
struct Notice {
    message: String,
    expires_at: Instant,
}

/// Holder of the current notice, if any.
#[derive(Debug, Default)]
pub struct Notifier {
    current: Mutex<Option<Notice>>,
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `message`, replacing any visible notice and restarting the timer.
    pub fn post(&self, message: impl Into<String>) {
        let notice = Notice {
            message: message.into(),
            expires_at: Instant::now() + NOTICE_TTL,
        };
        *self.lock() = Some(notice);
    }

    /// The visible message, or `None` once the window has elapsed.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        let mut current = self.lock();
        match current.as_ref() {
            Some(notice) if Instant::now() < notice.expires_at => Some(notice.message.clone()),
            Some(_) => {
                *current = None;
                None
            }
            None => None,
        }
    }

    /// Hide the notice before it expires.
    pub fn dismiss(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Notice>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
