use core::fmt;

use crate::{EPOCH, NodeId, id::layout::write_bit_layout_debug};

/// A 64-bit Snowflake-style user ID.
///
/// - 1 bit sign (always zero, keeps the value a non-negative `i64`)
/// - 41 bits timestamp (ms since [`EPOCH`])
/// - 5 bits datacenter ID
/// - 5 bits worker ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63       63 62            22 21              17 16          12 11             0
///              +----------+----------------+------------------+--------------+---------------+
///  Field:      | sign (1) | timestamp (41) | datacenter ID (5)| worker ID (5)| sequence (12) |
///              +----------+----------------+------------------+--------------+---------------+
///              |<----------------- MSB ------------ 64 bits ------------ LSB ----------------->|
/// ```
///
/// IDs order by timestamp first, then node, then sequence, so IDs from one
/// generator compare in generation order.
///
/// # Example
///
/// ```
/// use nodeflake::{EPOCH, UserId};
///
/// let id = UserId::from_components(1_932_800_123, 5, 3, 1);
/// assert_eq!(id.unix_millis(), EPOCH + 1_932_800_123);
/// assert_eq!(id.datacenter_id(), 5);
/// assert_eq!(id.worker_id(), 3);
/// assert_eq!(id.sequence(), 1);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId {
    id: u64,
}

impl UserId {
    pub const TIMESTAMP_BITS: u64 = 41;
    pub const DATACENTER_ID_BITS: u64 = 5;
    pub const WORKER_ID_BITS: u64 = 5;
    pub const SEQUENCE_BITS: u64 = 12;

    /// Bitmask for the 41-bit timestamp field. Occupies bits 22 through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for the 5-bit datacenter ID field. Occupies bits 17 through 21.
    pub const DATACENTER_ID_MASK: u64 = (1 << Self::DATACENTER_ID_BITS) - 1;

    /// Bitmask for the 5-bit worker ID field. Occupies bits 12 through 16.
    pub const WORKER_ID_MASK: u64 = (1 << Self::WORKER_ID_BITS) - 1;

    /// Bitmask for the 12-bit sequence field. Occupies bits 0 through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    pub const SEQUENCE_SHIFT: u64 = 0;
    pub const WORKER_ID_SHIFT: u64 = Self::SEQUENCE_BITS;
    pub const DATACENTER_ID_SHIFT: u64 = Self::WORKER_ID_SHIFT + Self::WORKER_ID_BITS;
    pub const TIMESTAMP_SHIFT: u64 = Self::DATACENTER_ID_SHIFT + Self::DATACENTER_ID_BITS;

    /// Largest sequence value; 4096 IDs fit in one millisecond.
    pub const MAX_SEQUENCE: u16 = Self::SEQUENCE_MASK as u16;

    const SIGN_BIT: u64 = 1 << 63;

    /// Packs the four fields into an ID. Each value is masked to its width.
    ///
    /// `timestamp` is milliseconds since [`EPOCH`], not since 1970.
    pub const fn from_components(
        timestamp: u64,
        datacenter_id: u64,
        worker_id: u64,
        sequence: u64,
    ) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let datacenter_id =
            (datacenter_id & Self::DATACENTER_ID_MASK) << Self::DATACENTER_ID_SHIFT;
        let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | datacenter_id | worker_id | sequence,
        }
    }

    /// Packs an ID for `node` at `timestamp` ms since [`EPOCH`].
    pub const fn for_node(timestamp: u64, node: NodeId, sequence: u64) -> Self {
        Self::from_components(
            timestamp,
            node.datacenter_id() as u64,
            node.worker_id() as u64,
            sequence,
        )
    }

    /// Extracts the timestamp, in milliseconds since [`EPOCH`].
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the timestamp as milliseconds since the Unix epoch.
    pub const fn unix_millis(&self) -> u64 {
        self.timestamp() + EPOCH
    }

    pub const fn datacenter_id(&self) -> u8 {
        ((self.id >> Self::DATACENTER_ID_SHIFT) & Self::DATACENTER_ID_MASK) as u8
    }

    pub const fn worker_id(&self) -> u8 {
        ((self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK) as u8
    }

    pub const fn sequence(&self) -> u16 {
        ((self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK) as u16
    }

    /// The node that produced this ID.
    pub const fn node_id(&self) -> NodeId {
        NodeId::from_masked(
            self.id >> Self::DATACENTER_ID_SHIFT,
            self.id >> Self::WORKER_ID_SHIFT,
        )
    }

    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// The ID as the signed integer handed to callers and storage.
    pub const fn to_i64(&self) -> i64 {
        self.id as i64
    }

    pub const fn from_i64(raw: i64) -> Self {
        Self { id: raw as u64 }
    }

    /// Returns `true` if the sign bit is clear, as it is for every ID a
    /// generator produces.
    pub const fn is_valid(&self) -> bool {
        self.id & Self::SIGN_BIT == 0
    }

    /// Returns the ID as a zero-padded 19-digit string, which sorts
    /// lexicographically in numeric order.
    pub fn to_padded_string(&self) -> String {
        format!("{:019}", self.id)
    }

    pub(crate) const fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::MAX_SEQUENCE
    }

    pub(crate) const fn increment_sequence(&self) -> Self {
        Self { id: self.id + 1 }
    }

    /// Returns an ID for a newer timestamp with the sequence reset to zero.
    pub(crate) const fn rollover_to_timestamp(&self, timestamp: u64) -> Self {
        Self::from_components(
            timestamp,
            self.datacenter_id() as u64,
            self.worker_id() as u64,
            0,
        )
    }

    /// Generator state before the first ID: the node fields are set and the
    /// sign bit marks that nothing has been issued.
    pub(crate) const fn unissued(node: NodeId) -> Self {
        Self {
            id: Self::for_node(0, node, 0).id | Self::SIGN_BIT,
        }
    }

    pub(crate) const fn is_unissued(&self) -> bool {
        self.id & Self::SIGN_BIT != 0
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.to_i64()
    }
}

impl From<UserId> for u64 {
    fn from(id: UserId) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bit_layout_debug(f, self)
    }
}
