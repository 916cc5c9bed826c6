//! # Subscription tokens.
//!
//! A [`Token`] holds at most one release action. Releasing is idempotent;
//! dropping a token releases it.
//!
//! ## Rules
//! - `release()` runs the action once; later calls do nothing.
//! - `detach()` gives up the token without releasing; the subscription then
//!   lives until its core is disposed.
//! - `then(f)` chains an extra action after the inner release.

use std::fmt;

type ReleaseFn = Box<dyn FnOnce() + Send + Sync>;

/// Scoped handle to one subscription.
#[must_use = "dropping a Token releases its subscription; call `detach` to keep it"]
pub struct Token {
    action: Option<ReleaseFn>,
}

impl Token {
    /// A token whose release does nothing.
    pub fn noop() -> Self {
        Self { action: None }
    }

    /// A token that runs `action` on release.
    pub fn from_fn(action: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            action: Some(Box::new(action)),
        }
    }

    /// Runs the release action if it has not run yet.
    pub fn release(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }

    /// True once the action has run, or if there never was one.
    pub fn is_released(&self) -> bool {
        self.action.is_none()
    }

    /// Consumes the token without releasing it.
    pub fn detach(mut self) {
        self.action = None;
    }

    /// Wraps this token: releasing the result releases `self`, then runs `action`.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicBool, Ordering};
    /// use broadcaster::Token;
    ///
    /// let flag = Arc::new(AtomicBool::new(false));
    /// let f = Arc::clone(&flag);
    /// let mut token = Token::noop().then(move || f.store(true, Ordering::SeqCst));
    ///
    /// token.release();
    /// assert!(flag.load(Ordering::SeqCst));
    /// ```
    pub fn then(self, action: impl FnOnce() + Send + Sync + 'static) -> Self {
        let mut inner = self;
        Self::from_fn(move || {
            inner.release();
            action();
        })
    }
}

impl Drop for Token {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>) -> Token {
        let c = Arc::clone(counter);
        Token::from_fn(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_release_is_idempotent() {
        let n = Arc::new(AtomicUsize::new(0));
        let mut token = counting(&n);
        assert!(!token.is_released());

        token.release();
        token.release();
        drop(token);
        assert_eq!(n.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases() {
        let n = Arc::new(AtomicUsize::new(0));
        drop(counting(&n));
        assert_eq!(n.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detach_skips_release() {
        let n = Arc::new(AtomicUsize::new(0));
        counting(&n).detach();
        assert_eq!(n.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_then_runs_inner_first_once() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (a, b) = (Arc::clone(&order), Arc::clone(&order));
        let mut token = Token::from_fn(move || a.lock().unwrap().push("inner"))
            .then(move || b.lock().unwrap().push("outer"));

        token.release();
        token.release();
        assert_eq!(*order.lock().unwrap(), vec!["inner", "outer"]);
    }

    #[test]
    fn test_noop_is_already_released() {
        let mut token = Token::noop();
        assert!(token.is_released());
        token.release();
    }
}
