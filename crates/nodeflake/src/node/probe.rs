use std::{fs, path::Path};

/// Host facts used to derive a node identity when none is configured.
///
/// [`SystemHost`] reads the real machine. Tests and unusual deployments can
/// supply their own implementation to [`NodeConfig::resolve_with`].
///
/// [`NodeConfig::resolve_with`]: crate::NodeConfig::resolve_with
pub trait HostProbe {
    /// Hardware address of a local, non-loopback network interface.
    fn mac_address(&self) -> Option<[u8; 6]>;

    /// The local hostname, if one is set.
    fn hostname(&self) -> Option<String>;
}

/// Where Linux exposes one directory per network interface.
const SYS_CLASS_NET: &str = "/sys/class/net";

/// Reads host facts from the running system.
///
/// - MAC address: the first interface under `/sys/class/net` (by name) that
///   is not loopback and has a non-zero address. Other platforms report
///   none.
/// - Hostname: `$HOSTNAME`, then `/etc/hostname`, then
///   `/proc/sys/kernel/hostname`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemHost;

impl HostProbe for SystemHost {
    fn mac_address(&self) -> Option<[u8; 6]> {
        first_hardware_address(Path::new(SYS_CLASS_NET))
    }

    fn hostname(&self) -> Option<String> {
        std::env::var("HOSTNAME")
            .ok()
            .and_then(non_empty)
            .or_else(|| read_trimmed(Path::new("/etc/hostname")))
            .or_else(|| read_trimmed(Path::new("/proc/sys/kernel/hostname")))
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().and_then(non_empty)
}

/// Scans a sysfs-style `net` directory for the first usable hardware address.
pub(crate) fn first_hardware_address(root: &Path) -> Option<[u8; 6]> {
    let mut names: Vec<_> = fs::read_dir(root)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.file_name()))
        .filter(|name| name != "lo")
        .collect();
    names.sort();

    names.iter().find_map(|name| {
        let raw = fs::read_to_string(root.join(name).join("address")).ok()?;
        parse_mac(raw.trim())
    })
}

/// Parses a colon-separated MAC address, rejecting the all-zero address.
pub(crate) fn parse_mac(s: &str) -> Option<[u8; 6]> {
    let mut mac = [0u8; 6];
    let mut parts = s.split(':');
    for byte in &mut mac {
        *byte = u8::from_str_radix(parts.next()?, 16).ok()?;
    }
    if parts.next().is_some() || mac == [0; 6] {
        return None;
    }
    Some(mac)
}
