use crate::{IdGenStatus, NodeId, Result, UserId};

/// A shared, thread-safe source of [`UserId`]s for one node.
///
/// Implementations keep the last issued ID as their only mutable state and
/// advance it atomically, so any number of threads can call
/// [`SnowflakeGenerator::next_id`] on the same instance.
pub trait SnowflakeGenerator {
    /// The node identity encoded into every ID from this generator.
    fn node_id(&self) -> NodeId;

    /// Attempts to generate the next ID without waiting.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRollback`] if the clock is behind the last issued ID.
    /// - [`Error::TimestampOutOfRange`] if the clock cannot be encoded.
    /// - [`Error::LockPoisoned`] if a lock-based implementation was poisoned.
    ///
    /// In every error case the generator state is unchanged.
    ///
    /// [`Error::ClockRollback`]: crate::Error::ClockRollback
    /// [`Error::TimestampOutOfRange`]: crate::Error::TimestampOutOfRange
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    fn try_poll_id(&self) -> Result<IdGenStatus>;

    /// Generates the next ID, spinning while the current millisecond's
    /// sequence is exhausted.
    ///
    /// The spin re-reads the clock on every attempt and ends as soon as the
    /// clock reaches the next millisecond, so it is bounded by about 1ms of
    /// wall time. Async callers on a cooperative runtime should use
    /// `SnowflakeGeneratorAsyncExt` instead.
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::try_poll_id`]. Errors are returned as soon
    /// as they occur and are never retried internally.
    fn next_id(&self) -> Result<UserId> {
        loop {
            match self.try_poll_id()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { .. } => core::hint::spin_loop(),
            }
        }
    }
}
