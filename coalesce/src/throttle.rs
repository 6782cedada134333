mod call;

pub use self::call::Call;

use crate::config::ThrottleConfig;
use crate::error::{panic_message, Error, Result};
use crate::runtime::{Runtime, TokioRuntime};
use futures::channel::oneshot::Sender;
use futures::future::{BoxFuture, FutureExt};
use std::fmt::{self, Debug};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error};

type Task<A, T, E> = dyn Fn(A) -> BoxFuture<'static, core::result::Result<T, E>> + Send + Sync;

/// Whether a busy window is currently open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Busy,
}

/// The call waiting for the end of the current window, with the completion shared by
/// every caller merged into it.
struct Pending<A, T, E> {
    args: A,
    tx: Sender<Result<T, E>>,
    call: Call<T, E>,
}

struct State<A, T, E> {
    phase: Phase,
    pending: Option<Pending<A, T, E>>,
}

impl<A, T, E> Default for State<A, T, E> {
    fn default() -> Self {
        Self { phase: Phase::Idle, pending: None }
    }
}

struct Inner<A, T, E, R> {
    task: Box<Task<A, T, E>>,
    config: ThrottleConfig,
    runtime: R,
    state: Mutex<State<A, T, E>>,
}

/// A wrapped function that executes at most once per busy window.
///
/// A call made while idle executes immediately and opens a window of
/// [`busy_time`](ThrottleConfig::busy_time). Calls made while the window is open are merged
/// into a single pending call: only the arguments of the latest one are kept, and all of
/// them resolve to the outcome of that one execution, which starts when the window ends and
/// opens the next window. A window that ends with nothing pending returns the throttle to
/// idle.
///
/// Clones share the same state.
pub struct Throttle<A, T, E, R = TokioRuntime> {
    inner: Arc<Inner<A, T, E, R>>,
}

impl<A, T, E> Throttle<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Debug + Send + Sync + 'static,
{
    /// Wraps an async function, driven by the ambient Tokio runtime.
    pub fn new<F, Fut>(func: F, busy_time: Duration) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<T, E>> + Send + 'static,
    {
        Self::with_config(func, ThrottleConfig::new(busy_time), TokioRuntime)
    }

    /// Wraps a synchronous function. It runs on the calling thread when dispatched.
    pub fn from_fn<F>(func: F, busy_time: Duration) -> Self
    where
        F: Fn(A) -> core::result::Result<T, E> + Send + Sync + 'static,
    {
        Self::new(move |args| std::future::ready(func(args)), busy_time)
    }
}

impl<A, T, E, R> Throttle<A, T, E, R>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Debug + Send + Sync + 'static,
    R: Runtime,
{
    /// Wraps an async function with explicit settings, driven by `runtime`.
    pub fn with_config<F, Fut>(func: F, config: ThrottleConfig, runtime: R) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<T, E>> + Send + 'static,
    {
        let task = move |args: A| -> BoxFuture<'static, core::result::Result<T, E>> {
            func(args).boxed()
        };
        Self {
            inner: Arc::new(Inner {
                task: Box::new(task),
                config,
                runtime,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Invokes the wrapped function, subject to throttling.
    ///
    /// Never blocks. The returned [`Call`] resolves once the execution this call was
    /// attached to has finished. Opening a window while `runtime` is unavailable resolves
    /// the call with [`Error::Unavailable`] and leaves the throttle idle.
    pub fn call(&self, args: A) -> Call<T, E> {
        let mut state = self.inner.lock_state();
        let phase = state.phase;
        match phase {
            Phase::Idle => {
                let (tx, call) = Call::channel();
                if !self.inner.runtime.is_available() {
                    drop(state);
                    let err = Error::Unavailable;
                    report(self.inner.config.label.as_deref(), &err);
                    let _ = tx.send(Err(err));
                    return call;
                }
                state.phase = Phase::Busy;
                drop(state);
                debug!(
                    label = ?self.inner.config.label,
                    busy_time = ?self.inner.config.busy_time,
                    "window opened"
                );
                // the boundary is fixed before the wrapped function gets to run
                let window = self.inner.runtime.sleep(self.inner.config.busy_time).boxed();
                let inner = Arc::clone(&self.inner);
                self.inner.runtime.spawn(inner.run_windows(window));
                self.inner.dispatch(args, tx);
                call
            }
            Phase::Busy => {
                if let Some(pending) = state.pending.as_mut() {
                    let call = pending.call.clone();
                    let superseded = std::mem::replace(&mut pending.args, args);
                    drop(state);
                    // dropped outside the lock, `A` may own arbitrary resources
                    drop(superseded);
                    debug!(label = ?self.inner.config.label, "pending call superseded");
                    call
                } else {
                    let (tx, call) = Call::channel();
                    state.pending = Some(Pending { args, tx, call: call.clone() });
                    call
                }
            }
        }
    }

    /// Whether a window is open right now.
    pub fn phase(&self) -> Phase {
        self.inner.lock_state().phase
    }

    /// Whether a call is waiting for the end of the current window.
    pub fn has_pending(&self) -> bool {
        self.inner.lock_state().pending.is_some()
    }

    /// Length of each busy window.
    pub fn busy_time(&self) -> Duration {
        self.inner.config.busy_time
    }

    /// The configuration this throttle was built with.
    pub fn config(&self) -> &ThrottleConfig {
        &self.inner.config
    }
}

impl<A, T, E, R> Inner<A, T, E, R>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Debug + Send + Sync + 'static,
    R: Runtime,
{
    fn lock_state(&self) -> MutexGuard<'_, State<A, T, E>> {
        // no critical section can panic halfway through an update
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps through consecutive windows, dispatching the pending call at each boundary
    /// until a window ends with nothing pending.
    async fn run_windows(self: Arc<Self>, first: BoxFuture<'static, ()>) {
        let mut window = first;
        loop {
            window.await;
            let Some(Pending { args, tx, .. }) = self.close_or_take() else {
                debug!(label = ?self.config.label, "window closed");
                return;
            };
            debug!(label = ?self.config.label, "window chained");
            window = self.runtime.sleep(self.config.busy_time).boxed();
            self.dispatch(args, tx);
        }
    }

    fn close_or_take(&self) -> Option<Pending<A, T, E>> {
        let mut state = self.lock_state();
        let pending = state.pending.take();
        if pending.is_none() {
            state.phase = Phase::Idle;
        }
        pending
    }

    /// Starts one execution and routes its outcome to `tx`.
    fn dispatch(&self, args: A, tx: Sender<Result<T, E>>) {
        let label = self.config.label.clone();
        let future = match panic::catch_unwind(AssertUnwindSafe(|| (self.task)(args))) {
            Ok(future) => future,
            Err(payload) => {
                let err = Error::Panicked(panic_message(&*payload));
                report(label.as_deref(), &err);
                let _ = tx.send(Err(err));
                return;
            }
        };
        self.runtime.spawn(async move {
            let outcome = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(Error::Execution(Arc::new(err))),
                Err(payload) => Err(Error::Panicked(panic_message(&*payload))),
            };
            if let Err(err) = &outcome {
                report(label.as_deref(), err);
            }
            // every caller may have dropped its `Call`
            let _ = tx.send(outcome);
        });
    }
}

fn report<E: Debug>(label: Option<&str>, err: &Error<E>) {
    error!(label = ?label, error = %err, "throttled execution failed");
}

impl<A, T, E, R> Clone for Throttle<A, T, E, R> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<A, T, E, R> Debug for Throttle<A, T, E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Throttle")
            .field("config", &self.inner.config)
            .field("phase", &state.phase)
            .field("pending", &state.pending.is_some())
            .finish()
    }
}
