use crate::{Error, HostProbe, NodeId, Result, SystemHost, UserId};

/// What to do when a node field must be derived from the host and the host
/// does not provide the data.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DetectionPolicy {
    /// Use [`NodeId::DEFAULT_FIELD`] for every missing field and log a
    /// warning.
    ///
    /// Every instance that falls back shares the same identity, so their IDs
    /// can collide. Suitable for development and single-instance
    /// deployments.
    #[default]
    Fallback,

    /// Fail construction with [`Error::NodeDetection`].
    Strict,
}

/// How to obtain this instance's [`NodeId`].
///
/// Explicit fields are validated and used as given. Any field left as `None`
/// is derived from the host:
///
/// - `worker_id`: low bits of a local network interface's MAC address.
/// - `datacenter_id`: low bits of an FNV-1a hash of the hostname.
///
/// Prefer explicit values in production (for example an orchestrator-assigned
/// ordinal). Derivation is best effort and can repeat across cloned VMs or
/// containers.
///
/// # Example
///
/// ```
/// use nodeflake::{DetectionPolicy, NodeConfig};
///
/// let node = NodeConfig::new()
///     .with_worker_id(3)
///     .with_datacenter_id(5)
///     .with_detection(DetectionPolicy::Strict)
///     .resolve()
///     .unwrap();
///
/// assert_eq!((node.worker_id(), node.datacenter_id()), (3, 5));
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeConfig {
    pub worker_id: Option<u8>,
    pub datacenter_id: Option<u8>,
    pub detection: DetectionPolicy,
}

impl NodeConfig {
    /// A configuration that derives both fields with the default policy.
    pub const fn new() -> Self {
        Self {
            worker_id: None,
            datacenter_id: None,
            detection: DetectionPolicy::Fallback,
        }
    }

    #[must_use]
    pub const fn with_worker_id(mut self, worker_id: u8) -> Self {
        self.worker_id = Some(worker_id);
        self
    }

    #[must_use]
    pub const fn with_datacenter_id(mut self, datacenter_id: u8) -> Self {
        self.datacenter_id = Some(datacenter_id);
        self
    }

    #[must_use]
    pub const fn with_detection(mut self, detection: DetectionPolicy) -> Self {
        self.detection = detection;
        self
    }

    /// Resolves the node identity against the running system.
    ///
    /// # Errors
    ///
    /// See [`NodeConfig::resolve_with`].
    pub fn resolve(&self) -> Result<NodeId> {
        self.resolve_with(&SystemHost)
    }

    /// Resolves the node identity using `host` for any derived field.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidNodeField`] if an explicit field exceeds 31. This is
    ///   checked before the host is consulted.
    /// - [`Error::NodeDetection`] if a field must be derived, the host lacks
    ///   the data, and the policy is [`DetectionPolicy::Strict`].
    pub fn resolve_with(&self, host: &impl HostProbe) -> Result<NodeId> {
        let explicit = NodeId::new(
            self.worker_id.unwrap_or(0),
            self.datacenter_id.unwrap_or(0),
        )?;
        if self.worker_id.is_some() && self.datacenter_id.is_some() {
            return Ok(explicit);
        }

        let worker = self.worker_id.map_or_else(|| derive_worker_id(host), Ok);
        let datacenter = self
            .datacenter_id
            .map_or_else(|| derive_datacenter_id(host), Ok);

        let node = match (worker, datacenter) {
            (Ok(worker), Ok(datacenter)) => NodeId::new(worker, datacenter)?,
            (worker, datacenter) => {
                let reason = [worker.err(), datacenter.err()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(", ");
                if self.detection == DetectionPolicy::Strict {
                    return Err(Error::NodeDetection { reason });
                }
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    %reason,
                    default = NodeId::DEFAULT_FIELD,
                    "node identity detection failed; IDs may collide with other instances using the default"
                );
                NodeId::new(
                    self.worker_id.unwrap_or(NodeId::DEFAULT_FIELD),
                    self.datacenter_id.unwrap_or(NodeId::DEFAULT_FIELD),
                )?
            }
        };
        Ok(node)
    }
}

fn derive_worker_id(host: &impl HostProbe) -> Result<u8, &'static str> {
    host.mac_address()
        .map(|mac| worker_id_from_mac(&mac))
        .ok_or("no usable network interface")
}

fn derive_datacenter_id(host: &impl HostProbe) -> Result<u8, &'static str> {
    host.hostname()
        .filter(|name| !name.is_empty())
        .map(|name| datacenter_id_from_hostname(&name))
        .ok_or("no hostname")
}

/// Masks the two low bytes of a hardware address down to a worker ID.
pub(crate) fn worker_id_from_mac(mac: &[u8; 6]) -> u8 {
    (u64::from(u16::from_be_bytes([mac[4], mac[5]])) & UserId::WORKER_ID_MASK) as u8
}

/// Masks a 64-bit FNV-1a hash of the hostname down to a datacenter ID.
pub(crate) fn datacenter_id_from_hostname(hostname: &str) -> u8 {
    (fnv1a(hostname.as_bytes()) & UserId::DATACENTER_ID_MASK) as u8
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes.iter().fold(OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}
