use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    IdGenStatus, NodeId, Result, SnowflakeGenerator, TimeSource, UserId,
    generator::state::{Step, step},
};

/// A lock-free generator suitable for multi-threaded environments.
///
/// The last issued ID is packed into one [`AtomicU64`] and advanced with a
/// single compare-and-swap, so timestamp and sequence always change
/// together. A lost race returns [`IdGenStatus::Pending`] with
/// `yield_for == 0`, and [`SnowflakeGenerator::next_id`] retries at once.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access is sacrificed for higher throughput
///
/// ## See Also
/// - [`LockSnowflakeGenerator`]
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
pub struct AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    node: NodeId,
    time: T,
}

impl<T> AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator for `node` that reads time from `time`.
    ///
    /// # Example
    /// ```
    /// use nodeflake::{AtomicSnowflakeGenerator, MonotonicClock, NodeId, SnowflakeGenerator};
    ///
    /// let generator = AtomicSnowflakeGenerator::new(NodeId::new(3, 5).unwrap(), MonotonicClock::new());
    /// let first = generator.next_id().unwrap();
    /// let second = generator.next_id().unwrap();
    /// assert!(second > first);
    /// ```
    pub fn new(node: NodeId, time: T) -> Self {
        Self::with_state(UserId::unissued(node), node, time)
    }

    /// Creates a generator whose last issued ID had `last_timestamp` (Unix
    /// ms) and `sequence`.
    pub fn from_components(last_timestamp: u64, sequence: u16, node: NodeId, time: T) -> Self {
        let id = UserId::for_node(
            last_timestamp.saturating_sub(crate::EPOCH),
            node,
            u64::from(sequence),
        );
        Self::with_state(id, node, time)
    }

    fn with_state(id: UserId, node: NodeId, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(id.to_raw())),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(id.to_raw()),
            node,
            time,
        }
    }

    /// Attempts to generate the next ID.
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::try_poll_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let current_raw = self.state.load(Ordering::Acquire);
        let now = self.time.current_millis();

        let next = match step(UserId::from_raw(current_raw), now)? {
            Step::Advance(next) => next,
            Step::Exhausted => return Ok(IdGenStatus::Pending { yield_for: 1 }),
        };

        if self
            .state
            .compare_exchange(
                current_raw,
                next.to_raw(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            )
            .is_ok()
        {
            Ok(IdGenStatus::Ready { id: next })
        } else {
            // Another thread won the race; retry immediately.
            Ok(IdGenStatus::Pending { yield_for: 0 })
        }
    }
}

impl<T> SnowflakeGenerator for AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn node_id(&self) -> NodeId {
        self.node
    }

    fn try_poll_id(&self) -> Result<IdGenStatus> {
        self.try_poll_id()
    }
}
