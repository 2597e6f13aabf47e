use crate::UserId;

/// The outcome of one non-blocking attempt to generate an ID.
///
/// - [`IdGenStatus::Ready`] carries a freshly generated ID.
/// - [`IdGenStatus::Pending`] means no ID was issued and the generator state
///   is unchanged: either all 4096 sequence values of the current
///   millisecond are used, or (for the lock-free generator) another thread
///   won the race for this attempt.
///
/// # Example
///
/// ```
/// use nodeflake::{IdGenStatus, LockSnowflakeGenerator, NodeId, SnowflakeGenerator, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_706_000_000_123
///     }
/// }
///
/// let generator = LockSnowflakeGenerator::new(NodeId::new(3, 5).unwrap(), FixedTime);
/// match generator.try_poll_id().unwrap() {
///     IdGenStatus::Ready { id } => assert_eq!(id.sequence(), 0),
///     IdGenStatus::Pending { yield_for } => println!("retry in {yield_for}ms"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: UserId,
    },
    /// No ID was generated; poll again.
    Pending {
        /// Milliseconds to wait before the next attempt can succeed. Zero
        /// means retry immediately.
        yield_for: u64,
    },
}
