/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `nodeflake` can emit.
///
/// Construction errors ([`Error::InvalidNodeField`], [`Error::NodeDetection`])
/// mean the generator must not be used. [`Error::ClockRollback`] is returned
/// per call and leaves the generator untouched, so the caller decides whether
/// to alert, fail the enclosing request, or retry later.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An explicitly supplied node field is outside `0..=max`.
    #[error("{field} {value} is out of range (expected 0..={max})")]
    InvalidNodeField {
        /// Which field was rejected (`"worker_id"` or `"datacenter_id"`).
        field: &'static str,
        /// The rejected value.
        value: u8,
        /// The largest accepted value.
        max: u8,
    },

    /// Node identity could not be derived from the host and the
    /// [`DetectionPolicy::Strict`] policy forbids the default fallback.
    ///
    /// [`DetectionPolicy::Strict`]: crate::DetectionPolicy::Strict
    #[error("node identity detection failed: {reason}")]
    NodeDetection {
        /// What was missing on the host.
        reason: String,
    },

    /// The clock returned a time earlier than the last one this generator
    /// used. No ID was produced and the generator state is unchanged.
    #[error("clock moved backwards by {behind_ms}ms (last used {last_timestamp}, now {now})")]
    ClockRollback {
        /// Last timestamp used by the generator, in Unix milliseconds.
        last_timestamp: u64,
        /// The offending clock reading, in Unix milliseconds.
        now: u64,
        /// Rollback magnitude in milliseconds.
        behind_ms: u64,
    },

    /// A batch request asked for fewer than one or more than `max` IDs.
    #[error("batch size {count} is out of range (expected 1..={max})")]
    InvalidBatchSize {
        /// The requested count.
        count: i32,
        /// The largest accepted batch.
        max: i32,
    },

    /// The clock reading cannot be encoded: it is earlier than [`EPOCH`] or
    /// past the end of the 41-bit timestamp range.
    ///
    /// [`EPOCH`]: crate::EPOCH
    #[error("timestamp {millis} is outside the encodable range")]
    TimestampOutOfRange {
        /// The offending clock reading, in Unix milliseconds.
        millis: u64,
    },

    /// The generator lock was poisoned by a panicking thread.
    ///
    /// Only produced by the `std` mutex; with the `parking-lot` feature
    /// mutexes do not poison.
    #[error("generator lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns `true` if retrying the same call later can succeed.
    ///
    /// Only a clock rollback is transient: once the clock catches up with the
    /// last used timestamp, generation resumes.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ClockRollback { .. })
    }
}

#[cfg(not(feature = "parking-lot"))]
impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
