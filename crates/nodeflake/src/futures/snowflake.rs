use core::{future::Future, time::Duration};

use super::SleepProvider;
use crate::{IdGenStatus, Result, SnowflakeGenerator, UserId};

/// Extension trait for generating IDs from async code without blocking the
/// executor.
///
/// Where [`SnowflakeGenerator::next_id`] spins while the sequence is
/// exhausted, this awaits the chosen [`SleepProvider`] between attempts so
/// other tasks on a cooperative runtime keep running.
pub trait SnowflakeGeneratorAsyncExt {
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// Resolves to an error as soon as the generator reports one, including
    /// [`Error::ClockRollback`]; errors are never retried.
    ///
    /// [`Error::ClockRollback`]: crate::Error::ClockRollback
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<UserId>>
    where
        S: SleepProvider;
}

impl<G> SnowflakeGeneratorAsyncExt for G
where
    G: SnowflakeGenerator + Sync,
{
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<UserId>>
    where
        S: SleepProvider,
    {
        async {
            loop {
                let dur = match self.try_poll_id()? {
                    IdGenStatus::Ready { id } => return Ok(id),
                    IdGenStatus::Pending { yield_for } => Duration::from_millis(yield_for),
                };
                S::sleep_for(dur).await;
            }
        }
    }
}
