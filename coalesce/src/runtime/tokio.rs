use super::Runtime;
use std::future::Future;
use std::time::Duration;

/// Runs on the ambient Tokio runtime.
///
/// A [`Throttle::call`](crate::Throttle::call) that has to open a window outside of a Tokio
/// runtime context fails with [`Error::Unavailable`](crate::Error::Unavailable).
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioRuntime;

impl Runtime for TokioRuntime {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send + 'static {
        ::tokio::time::sleep(duration)
    }
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        ::tokio::spawn(future);
    }
    fn is_available(&self) -> bool {
        ::tokio::runtime::Handle::try_current().is_ok()
    }
}
