use crate::error::{Error, Result};
use futures::channel::oneshot::{self, Receiver, Sender};
use futures::future::{FutureExt, Shared};
use std::fmt::{self, Debug};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The deferred outcome of a [`Throttle::call`](crate::Throttle::call).
///
/// Every caller merged into the same pending call holds a clone of the same `Call`, and
/// all of them resolve to the identical outcome.
pub struct Call<T, E> {
    inner: Shared<Receiver<Result<T, E>>>,
}

impl<T, E> Call<T, E>
where
    T: Clone,
{
    pub(crate) fn channel() -> (Sender<Result<T, E>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { inner: rx.shared() })
    }
}

impl<T, E> Future for Call<T, E>
where
    T: Clone,
{
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // a dropped sender means the dispatch never delivered an outcome
        self.inner.poll_unpin(cx).map(|received| received.unwrap_or(Err(Error::Abandoned)))
    }
}

impl<T, E> Clone for Call<T, E>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T, E> Debug for Call<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call").finish_non_exhaustive()
    }
}
