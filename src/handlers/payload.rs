//! Type-erased payloads for loosely typed broadcasts.
//!
//! Publishers and handlers agree on the concrete type out of band; the
//! registry only ever sees a [`Payload`]. Narrowing happens at the boundary
//! via [`downcast`], and a failed narrowing is an ordinary handler failure.

use std::any::{Any, type_name};
use std::sync::Arc;

use crate::error::HandlerError;

/// Shared, type-erased payload.
///
/// Cloning is an `Arc` clone, so every handler of one broadcast observes the
/// same allocation the publisher passed in.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Erases `value` into a [`Payload`].
pub fn payload<T: Any + Send + Sync>(value: T) -> Payload {
    Arc::new(value)
}

/// Narrows a [`Payload`] to `Arc<T>`, sharing the same allocation.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use broadcaster::{downcast, payload};
///
/// let p = payload(String::from("hello"));
/// let s: Arc<String> = downcast(&p).unwrap();
/// assert_eq!(s.as_str(), "hello");
/// assert!(downcast::<u32>(&p).is_err());
/// ```
pub fn downcast<T: Any + Send + Sync>(payload: &Payload) -> Result<Arc<T>, HandlerError> {
    Arc::clone(payload)
        .downcast::<T>()
        .map_err(|_| HandlerError::PayloadMismatch {
            expected: type_name::<T>(),
        })
}
