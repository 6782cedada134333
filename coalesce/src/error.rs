use std::sync::Arc;
use thiserror::Error;

/// Type alias for the outcome a [`Call`](crate::Call) resolves to.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Failure delivered to every caller attached to a dispatch.
///
/// The error is shared between all callers merged into the same window, so the
/// wrapped function's error is kept behind an [`Arc`].
#[derive(Error, Debug)]
pub enum Error<E> {
    #[error("execution failed: {0:?}")]
    Execution(Arc<E>),
    #[error("execution panicked: {0}")]
    Panicked(Arc<str>),
    #[error("execution was abandoned before it completed")]
    Abandoned,
    #[error("no runtime available to open a window on")]
    Unavailable,
}

impl<E> Error<E> {
    /// Returns the wrapped function's error, if that is what failed.
    pub fn execution(&self) -> Option<&E> {
        match self {
            Self::Execution(err) => Some(err),
            _ => None,
        }
    }
}

impl<E> Clone for Error<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Execution(err) => Self::Execution(Arc::clone(err)),
            Self::Panicked(msg) => Self::Panicked(Arc::clone(msg)),
            Self::Abandoned => Self::Abandoned,
            Self::Unavailable => Self::Unavailable,
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> Arc<str> {
    if let Some(s) = payload.downcast_ref::<&str>() {
        Arc::from(*s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        Arc::from(s.as_str())
    } else {
        Arc::from("non-string panic payload")
    }
}
