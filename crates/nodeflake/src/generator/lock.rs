use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    IdGenStatus, NodeId, Result, SnowflakeGenerator, TimeSource, UserId,
    generator::{
        mutex::Mutex,
        state::{Step, step},
    },
};

/// A lock-based generator suitable for multi-threaded environments.
///
/// The last issued ID lives behind an [`Arc<Mutex<_>>`]; reading the clock,
/// comparing it with the stored timestamp, and storing the successor all
/// happen under the lock. Clones share that state, so handing a clone to
/// each thread is equivalent to sharing one generator.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access across threads is important
///
/// ## See Also
/// - [`AtomicSnowflakeGenerator`]
///
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
pub struct LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<UserId>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<UserId>>,
    node: NodeId,
    time: T,
}

impl<T> LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator for `node` that reads time from `time`.
    ///
    /// # Example
    /// ```
    /// use nodeflake::{LockSnowflakeGenerator, NodeId, SnowflakeGenerator, SystemClock};
    ///
    /// let generator = LockSnowflakeGenerator::new(NodeId::new(3, 5).unwrap(), SystemClock);
    /// let id = generator.next_id().unwrap();
    /// assert_eq!((id.worker_id(), id.datacenter_id()), (3, 5));
    /// ```
    pub fn new(node: NodeId, time: T) -> Self {
        Self::with_state(UserId::unissued(node), node, time)
    }

    /// Creates a generator whose last issued ID had `last_timestamp` (Unix
    /// ms) and `sequence`.
    ///
    /// Useful for tests and for seeding a generator that must never go below
    /// a known point. Values outside the encodable range are masked.
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
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(id))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(id)),
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
        #[cfg(feature = "parking-lot")]
        let mut id = self.state.lock();
        #[cfg(not(feature = "parking-lot"))]
        let mut id = self.state.lock()?;

        // Read under the lock so concurrent callers observe ordered times.
        let now = self.time.current_millis();

        match step(*id, now)? {
            Step::Advance(next) => {
                *id = next;
                Ok(IdGenStatus::Ready { id: next })
            }
            Step::Exhausted => Ok(IdGenStatus::Pending { yield_for: 1 }),
        }
    }
}

impl<T> Clone for LockSnowflakeGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            node: self.node,
            time: self.time.clone(),
        }
    }
}

impl<T> SnowflakeGenerator for LockSnowflakeGenerator<T>
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
