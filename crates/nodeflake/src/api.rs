#[cfg(feature = "async-tokio")]
use crate::{SnowflakeGeneratorAsyncExt, TokioYield};
use crate::{
    Error, LockSnowflakeGenerator, NodeConfig, NodeId, Result, SnowflakeGenerator, SystemClock,
};

/// Largest number of IDs [`UserIdGenerator::generate_user_ids`] returns in
/// one call.
pub const MAX_BATCH_SIZE: i32 = 1000;

/// The entry point for producing user IDs.
///
/// Wraps a [`SnowflakeGenerator`] (by default a [`LockSnowflakeGenerator`]
/// on the system wall clock) and hands IDs out as `i64`, ready to persist.
/// The node identity is fixed when the generator is built and every method
/// takes `&self`, so one instance can be shared by all request handlers.
///
/// # Example
///
/// ```
/// use nodeflake::{UserIdGenerator, parse_datacenter_id, parse_worker_id};
///
/// let generator = UserIdGenerator::new(Some(3), Some(5)).unwrap();
///
/// let id = generator.generate_user_id().unwrap();
/// assert_eq!(parse_worker_id(id), 3);
/// assert_eq!(parse_datacenter_id(id), 5);
///
/// let batch = generator.generate_user_ids(10).unwrap();
/// assert_eq!(batch.len(), 10);
/// assert!(batch.windows(2).all(|pair| pair[0] < pair[1]));
/// assert!(batch[0] > id);
/// ```
pub struct UserIdGenerator<G = LockSnowflakeGenerator<SystemClock>> {
    generator: G,
}

impl UserIdGenerator {
    /// Builds a generator on the system clock.
    ///
    /// Each `None` is derived from the host (see [`NodeConfig`]); if the host
    /// lacks the data the field defaults to `1` and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeField`] if an explicit value exceeds 31.
    pub fn new(worker_id: Option<u8>, datacenter_id: Option<u8>) -> Result<Self> {
        Self::from_config(&NodeConfig {
            worker_id,
            datacenter_id,
            ..NodeConfig::new()
        })
    }

    /// Builds a generator on the system clock from a full [`NodeConfig`].
    ///
    /// # Errors
    ///
    /// See [`NodeConfig::resolve`].
    pub fn from_config(config: &NodeConfig) -> Result<Self> {
        let node = config.resolve()?;
        Ok(Self::from_generator(LockSnowflakeGenerator::new(
            node,
            SystemClock,
        )))
    }
}

impl<G> UserIdGenerator<G>
where
    G: SnowflakeGenerator,
{
    /// Wraps an already configured generator, e.g. one with a different
    /// clock or the lock-free implementation.
    pub fn from_generator(generator: G) -> Self {
        #[cfg(feature = "tracing")]
        tracing::info!(
            datacenter_id = generator.node_id().datacenter_id(),
            worker_id = generator.node_id().worker_id(),
            "user id generator ready"
        );
        Self { generator }
    }

    /// The node identity frozen into every ID from this generator.
    pub fn node_id(&self) -> NodeId {
        self.generator.node_id()
    }

    /// The underlying generator, e.g. for polling without spinning.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generates the next ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockRollback`] if the clock is behind the last
    /// issued ID. Nothing is retried; the next call after the clock catches
    /// up succeeds as if the failed call never happened.
    pub fn next_id(&self) -> Result<i64> {
        self.generator.next_id().map(i64::from)
    }

    /// Generates one user ID. Same as [`UserIdGenerator::next_id`].
    ///
    /// # Errors
    ///
    /// See [`UserIdGenerator::next_id`].
    pub fn generate_user_id(&self) -> Result<i64> {
        self.next_id()
    }

    /// Generates `count` IDs in generation order.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBatchSize`] unless `1 <= count <= 1000`.
    /// - [`Error::ClockRollback`] if the clock steps back mid-batch; IDs
    ///   generated before the failure are discarded.
    pub fn generate_user_ids(&self, count: i32) -> Result<Vec<i64>> {
        if !(1..=MAX_BATCH_SIZE).contains(&count) {
            return Err(Error::InvalidBatchSize {
                count,
                max: MAX_BATCH_SIZE,
            });
        }
        (0..count).map(|_| self.next_id()).collect()
    }

    /// Generates the next ID, yielding to the Tokio scheduler instead of
    /// spinning while the sequence is exhausted.
    ///
    /// # Errors
    ///
    /// See [`UserIdGenerator::next_id`].
    #[cfg(feature = "async-tokio")]
    pub async fn next_id_async(&self) -> Result<i64>
    where
        G: Sync,
    {
        self.generator
            .try_next_id_async::<TokioYield>()
            .await
            .map(i64::from)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
    };

    use super::*;
    use crate::{
        AtomicSnowflakeGenerator, EPOCH, MonotonicClock, TimeSource, parse_datacenter_id,
        parse_sequence, parse_timestamp, parse_worker_id,
    };

    const T: u64 = 1_706_000_000_123;

    #[derive(Clone)]
    struct MockTime {
        millis: Arc<AtomicU64>,
    }

    impl MockTime {
        fn at(millis: u64) -> Self {
            Self {
                millis: Arc::new(AtomicU64::new(millis)),
            }
        }
    }

    impl TimeSource for MockTime {
        fn current_millis(&self) -> u64 {
            self.millis.load(Ordering::SeqCst)
        }
    }

    fn mocked(time: &MockTime) -> UserIdGenerator<LockSnowflakeGenerator<MockTime>> {
        UserIdGenerator::from_generator(LockSnowflakeGenerator::new(
            NodeId::new(3, 5).unwrap(),
            time.clone(),
        ))
    }

    #[test]
    fn rejects_out_of_range_node() {
        assert!(matches!(
            UserIdGenerator::new(Some(32), Some(0)),
            Err(Error::InvalidNodeField {
                field: "worker_id",
                ..
            })
        ));
        assert!(matches!(
            UserIdGenerator::new(Some(0), Some(200)),
            Err(Error::InvalidNodeField {
                field: "datacenter_id",
                ..
            })
        ));
    }

    #[test]
    fn auto_detected_node_is_in_range() {
        let generator = UserIdGenerator::new(None, None).unwrap();
        let node = generator.node_id();
        assert!(node.worker_id() <= NodeId::MAX_WORKER_ID);
        assert!(node.datacenter_id() <= NodeId::MAX_DATACENTER_ID);
    }

    #[test]
    fn round_trip_with_mocked_clock() {
        let generator = mocked(&MockTime::at(T));
        let id = generator.next_id().unwrap();
        assert_eq!(parse_worker_id(id), 3);
        assert_eq!(parse_datacenter_id(id), 5);
        assert_eq!(parse_timestamp(id), T as i64);
        assert_eq!(parse_sequence(id), 0);
    }

    #[test]
    fn exposes_node_and_generator() {
        let generator = mocked(&MockTime::at(T));
        assert_eq!(generator.node_id(), NodeId::new(3, 5).unwrap());
        assert_eq!(generator.generator().node_id(), generator.node_id());
    }

    #[test]
    fn concrete_scenario() {
        let generator = mocked(&MockTime::at(T));
        let first = generator.generate_user_id().unwrap();
        assert_eq!(
            first,
            ((T as i64 - EPOCH as i64) << 22) | (5 << 17) | (3 << 12)
        );

        let second = generator.generate_user_id().unwrap();
        assert_eq!(second, first + 1);
        assert_eq!(parse_worker_id(second), 3);
        assert_eq!(parse_datacenter_id(second), 5);
        assert_eq!(parse_sequence(second), 1);
        assert_eq!(parse_timestamp(second), 1_706_000_000_123);
    }

    #[test]
    fn rollback_leaves_state_untouched() {
        let time = MockTime::at(T);
        let generator = mocked(&time);
        let before = generator.next_id().unwrap();

        time.millis.store(T - 1000, Ordering::SeqCst);
        assert!(matches!(
            generator.next_id(),
            Err(Error::ClockRollback {
                behind_ms: 1000,
                ..
            })
        ));
        assert!(generator.generate_user_ids(5).is_err());

        time.millis.store(T, Ordering::SeqCst);
        let after = generator.next_id().unwrap();
        assert_eq!(after, before + 1);
    }

    #[test]
    fn batch_bounds() {
        let generator = mocked(&MockTime::at(T));
        for count in [0, -1, 1001, i32::MIN, i32::MAX] {
            assert_eq!(
                generator.generate_user_ids(count),
                Err(Error::InvalidBatchSize { count, max: 1000 })
            );
        }
        assert_eq!(generator.generate_user_ids(1).unwrap().len(), 1);
    }

    #[test]
    fn full_batch_is_unique_and_increasing() {
        let generator = UserIdGenerator::from_generator(AtomicSnowflakeGenerator::new(
            NodeId::new(3, 5).unwrap(),
            MonotonicClock::new(),
        ));
        let ids = generator.generate_user_ids(MAX_BATCH_SIZE).unwrap();
        assert_eq!(ids.len(), 1000);
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 1000);
    }

    #[test]
    fn batch_rolls_into_next_millisecond() {
        let time = MockTime::at(T);
        let generator = mocked(&time);
        for _ in 0..4 {
            generator.generate_user_ids(1000).unwrap();
        }
        // 4000 used; 96 left in this millisecond.
        let tail = generator.generate_user_ids(96).unwrap();
        assert_eq!(parse_sequence(*tail.last().unwrap()), 4095);

        time.millis.store(T + 1, Ordering::SeqCst);
        let next = generator.generate_user_ids(2).unwrap();
        assert_eq!(parse_sequence(next[0]), 0);
        assert_eq!(parse_timestamp(next[0]), T as i64 + 1);
    }

    #[test]
    fn sequential_uniqueness() {
        let generator = UserIdGenerator::new(Some(1), Some(2)).unwrap();
        let mut seen = HashSet::with_capacity(100_000);
        let mut last = i64::MIN;
        for _ in 0..100_000 {
            let id = generator.next_id().unwrap();
            assert!(id > last);
            assert!(id > 0);
            last = id;
            seen.insert(id);
        }
        assert_eq!(seen.len(), 100_000);
    }

    #[cfg(feature = "async-tokio")]
    #[tokio::test(flavor = "current_thread")]
    async fn async_next_id_matches_node() {
        let generator = mocked(&MockTime::at(T));
        let id = generator.next_id_async().await.unwrap();
        assert_eq!(parse_worker_id(id), 3);
        assert_eq!(parse_timestamp(id), T as i64);
    }
}
