//! Stateless decoding of raw `i64` IDs.
//!
//! These functions need no generator and are safe to call from any thread.
//! They are meant for diagnostics and tracing: a value that was not produced
//! by a generator still decodes, field by field, without error.

use chrono::{DateTime, SecondsFormat};

use crate::{EPOCH, UserId};

/// Returns the creation time of `id` in milliseconds since the Unix epoch.
///
/// The shift is arithmetic, so a negative `id` (never produced by a
/// generator) decodes to a time before [`EPOCH`].
///
/// ```
/// use nodeflake::{EPOCH, parse_timestamp};
///
/// assert_eq!(parse_timestamp(8_106_751_287_767_041), 1_706_000_000_123);
/// assert_eq!(parse_timestamp(-1), EPOCH as i64 - 1);
/// ```
pub const fn parse_timestamp(id: i64) -> i64 {
    (id >> UserId::TIMESTAMP_SHIFT) + EPOCH as i64
}

pub const fn parse_datacenter_id(id: i64) -> u8 {
    UserId::from_i64(id).datacenter_id()
}

pub const fn parse_worker_id(id: i64) -> u8 {
    UserId::from_i64(id).worker_id()
}

pub const fn parse_sequence(id: i64) -> u16 {
    UserId::from_i64(id).sequence()
}

/// Renders every decoded field of `id` on one line, for logs and traces.
///
/// The output is for humans; do not parse it.
///
/// ```
/// use nodeflake::format_id;
///
/// assert_eq!(
///     format_id(8_106_751_287_767_041),
///     "UserId { id: 8106751287767041, timestamp: 1706000000123 (2024-01-23T08:53:20.123Z), \
///      datacenter_id: 5, worker_id: 3, sequence: 1 }"
/// );
/// ```
pub fn format_id(id: i64) -> String {
    let timestamp = parse_timestamp(id);
    format!(
        "UserId {{ id: {id}, timestamp: {timestamp} ({}), datacenter_id: {}, worker_id: {}, sequence: {} }}",
        rfc3339_millis(timestamp),
        parse_datacenter_id(id),
        parse_worker_id(id),
        parse_sequence(id),
    )
}

/// Formats Unix milliseconds as a UTC RFC 3339 instant with millisecond
/// precision.
fn rfc3339_millis(unix_millis: i64) -> String {
    DateTime::from_timestamp_millis(unix_millis).map_or_else(
        || "out of range".to_owned(),
        |t| t.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

// Decoding must agree with the packed layout.
const _: () = assert!(parse_timestamp(0) == EPOCH as i64);
