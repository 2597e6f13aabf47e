use core::{future::Future, time::Duration};

/// A trait that abstracts over how to wait for a given [`Duration`] in async
/// contexts.
///
/// This allows the async generator extension to be generic over runtimes.
pub trait SleepProvider {
    /// Returns a future that completes after `dur`, or sooner if the
    /// implementation only yields to the scheduler.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}
