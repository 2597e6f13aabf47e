use core::cmp::Ordering;

use crate::{EPOCH, Error, Result, UserId};

/// What a generator should do with its state for one clock reading.
pub(crate) enum Step {
    /// Store and return this ID.
    Advance(UserId),
    /// The sequence for the current millisecond is used up.
    Exhausted,
}

/// Computes the successor of `current`, the last issued ID, at
/// `now_millis` (Unix ms). Never mutates anything, so an error leaves the
/// caller's state as it was.
///
/// A reading behind the last issued timestamp is a rollback even when it is
/// also before [`EPOCH`].
#[inline]
pub(crate) fn step(current: UserId, now_millis: u64) -> Result<Step> {
    if current.is_unissued() {
        let now = encodable_timestamp(now_millis)?;
        return Ok(Step::Advance(current.rollover_to_timestamp(now)));
    }

    let last_millis = current.unix_millis();
    match now_millis.cmp(&last_millis) {
        Ordering::Equal => {
            if current.has_sequence_room() {
                Ok(Step::Advance(current.increment_sequence()))
            } else {
                Ok(Step::Exhausted)
            }
        }
        Ordering::Greater => {
            let now = encodable_timestamp(now_millis)?;
            Ok(Step::Advance(current.rollover_to_timestamp(now)))
        }
        Ordering::Less => Err(cold_clock_behind(last_millis, now_millis)),
    }
}

/// Converts Unix ms to the offset stored in an ID.
#[inline]
fn encodable_timestamp(now_millis: u64) -> Result<u64> {
    match now_millis.checked_sub(EPOCH) {
        Some(delta) if delta <= UserId::TIMESTAMP_MASK => Ok(delta),
        _ => Err(Error::TimestampOutOfRange { millis: now_millis }),
    }
}

#[cold]
#[inline(never)]
fn cold_clock_behind(last_timestamp: u64, now: u64) -> Error {
    let behind_ms = last_timestamp - now;
    #[cfg(feature = "tracing")]
    tracing::debug!(last_timestamp, now, behind_ms, "clock moved backwards");
    Error::ClockRollback {
        last_timestamp,
        now,
        behind_ms,
    }
}
