//! Accessors for request-scoped values owned by the host.
use std::sync::Arc;

/// A read-only handle to a value that lives for the duration of a request.
///
/// The host decides where the value comes from; binders only ever read it.
/// An implementation must return the same value for the whole duration of a binding attempt.
pub trait ScopedInstance<T>: Send + Sync {
    /// The current value.
    fn value(&self) -> Arc<T>;
}

impl<T> ScopedInstance<T> for Arc<T>
where
    T: Send + Sync,
{
    fn value(&self) -> Arc<T> {
        Arc::clone(self)
    }
}
