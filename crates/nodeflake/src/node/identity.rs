use core::fmt;

use crate::{Error, Result, UserId};

/// The `(datacenter_id, worker_id)` pair that distinguishes one generator
/// instance from every other.
///
/// Both fields are 5 bits wide. A `NodeId` can only be built through
/// [`NodeId::new`] (or resolved by [`NodeConfig`]), so every value in
/// circulation is in range.
///
/// [`NodeConfig`]: crate::NodeConfig
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    datacenter_id: u8,
    worker_id: u8,
}

impl NodeId {
    /// Largest valid datacenter ID.
    pub const MAX_DATACENTER_ID: u8 = UserId::DATACENTER_ID_MASK as u8;

    /// Largest valid worker ID.
    pub const MAX_WORKER_ID: u8 = UserId::WORKER_ID_MASK as u8;

    /// Value used for both fields when host detection fails.
    pub const DEFAULT_FIELD: u8 = 1;

    /// The identity assumed when host detection fails.
    pub const DEFAULT: Self = Self {
        datacenter_id: Self::DEFAULT_FIELD,
        worker_id: Self::DEFAULT_FIELD,
    };

    /// Validates and builds a node identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeField`] if either value exceeds 31.
    ///
    /// # Example
    ///
    /// ```
    /// use nodeflake::{Error, NodeId};
    ///
    /// let node = NodeId::new(3, 5).unwrap();
    /// assert_eq!(node.worker_id(), 3);
    /// assert_eq!(node.datacenter_id(), 5);
    ///
    /// assert!(matches!(
    ///     NodeId::new(32, 0),
    ///     Err(Error::InvalidNodeField { field: "worker_id", value: 32, .. })
    /// ));
    /// ```
    pub const fn new(worker_id: u8, datacenter_id: u8) -> Result<Self> {
        if worker_id > Self::MAX_WORKER_ID {
            return Err(Error::InvalidNodeField {
                field: "worker_id",
                value: worker_id,
                max: Self::MAX_WORKER_ID,
            });
        }
        if datacenter_id > Self::MAX_DATACENTER_ID {
            return Err(Error::InvalidNodeField {
                field: "datacenter_id",
                value: datacenter_id,
                max: Self::MAX_DATACENTER_ID,
            });
        }
        Ok(Self {
            datacenter_id,
            worker_id,
        })
    }

    /// Builds a node identity from already-masked ID fields.
    pub(crate) const fn from_masked(datacenter_id: u64, worker_id: u64) -> Self {
        Self {
            datacenter_id: (datacenter_id & UserId::DATACENTER_ID_MASK) as u8,
            worker_id: (worker_id & UserId::WORKER_ID_MASK) as u8,
        }
    }

    pub const fn datacenter_id(&self) -> u8 {
        self.datacenter_id
    }

    pub const fn worker_id(&self) -> u8 {
        self.worker_id
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "datacenter {} / worker {}",
            self.datacenter_id, self.worker_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_range() {
        for worker in 0..=31 {
            for datacenter in 0..=31 {
                let node = NodeId::new(worker, datacenter).unwrap();
                assert_eq!(node.worker_id(), worker);
                assert_eq!(node.datacenter_id(), datacenter);
            }
        }
    }

    #[test]
    fn rejects_out_of_range_datacenter() {
        assert_eq!(
            NodeId::new(0, 32),
            Err(Error::InvalidNodeField {
                field: "datacenter_id",
                value: 32,
                max: 31
            })
        );
        assert!(NodeId::new(255, 255).is_err());
    }

    #[test]
    fn default_is_one_one() {
        assert_eq!(NodeId::DEFAULT, NodeId::new(1, 1).unwrap());
    }
}
