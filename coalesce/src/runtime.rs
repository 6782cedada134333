//! Timer and task primitives the throttle is driven by.
#[cfg(feature = "smol")]
mod smol;
mod tokio;

#[cfg(feature = "smol")]
pub use self::smol::SmolRuntime;
pub use self::tokio::TokioRuntime;

use std::future::Future;
use std::time::Duration;

/// Scheduling primitives needed by a [`Throttle`](crate::Throttle).
///
/// `sleep` realizes "after the busy time", `spawn` runs dispatched executions and
/// the window driver in the background. Neither has to support cancellation.
#[trait_variant::make(Send)]
pub trait Runtime: Send + Sync + 'static {
    /// Returns a timer that completes `duration` after this call, not after its first poll.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + 'static;
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
    /// Whether `sleep` and `spawn` can be used from the current thread.
    fn is_available(&self) -> bool {
        true
    }
}
