use crate::throttle::Throttle;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

/// Turns an async function into a [`Throttle`].
pub trait Throttleable<A, T, E>
where
    Self: std::marker::Sized,
{
    fn throttled(self, busy_time: Duration) -> Throttle<A, T, E>;
}

impl<F, Fut, A, T, E> Throttleable<A, T, E> for F
where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Debug + Send + Sync + 'static,
{
    fn throttled(self, busy_time: Duration) -> Throttle<A, T, E> {
        Throttle::new(self, busy_time)
    }
}
