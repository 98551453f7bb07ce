//! Cancellation tokens for database operations.

use crate::error::{Error, Result};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

//-----------------------------------------------------------------------------

/// A caller-supplied token that aborts in-flight database operations.
///
/// The token is cancelled explicitly with [`Cancellation::cancel`] or implicitly when its deadline passes.
/// Clones share the same cancellation flag, so a token can be cancelled from another thread.
/// Every database operation checks the token before touching the database, and long-running statements are interrupted through the SQLite progress handler.
/// A cancelled operation returns [`Error::Cancelled`].
///
/// # Examples
///
/// ```
/// use genobase::Cancellation;
/// use std::time::Duration;
///
/// let token = Cancellation::new();
/// assert!(!token.is_cancelled());
/// let other = token.clone();
/// other.cancel();
/// assert!(token.is_cancelled());
///
/// let expired = Cancellation::with_timeout(Duration::ZERO);
/// assert!(expired.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// Returns a token that is only cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a token that cancels itself after the given duration.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Returns a token that cancels itself at the given instant.
    pub fn with_deadline(deadline: Instant) -> Self {
        Cancellation {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Cancels all operations using this token or its clones.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns `true` if the token has been cancelled or its deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::Relaxed) {
            return true;
        }
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Returns [`Error::Cancelled`] for the given operation if the token has been cancelled.
    pub fn check(&self, operation: &'static str) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled { operation })
        } else {
            Ok(())
        }
    }
}

//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;

    #[test]
    fn cancel_from_another_thread() {
        let token = Cancellation::new();
        assert!(token.check("test").is_ok(), "New token should not be cancelled");

        let other = token.clone();
        let handle = thread::spawn(move || other.cancel());
        handle.join().unwrap();

        let result = token.check("test");
        assert!(matches!(result, Err(Error::Cancelled { operation: "test" })), "Token was not cancelled");
    }

    #[test]
    fn deadline() {
        let token = Cancellation::with_timeout(Duration::from_secs(3600));
        assert!(!token.is_cancelled(), "Token expired too early");

        let token = Cancellation::with_deadline(Instant::now());
        assert!(token.is_cancelled(), "Token did not expire");
    }
}

//-----------------------------------------------------------------------------
