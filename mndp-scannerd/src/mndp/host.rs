use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};
use shared::codec::HostFacts;
use crate::config::AnnounceConfig;

const PROC_UPTIME: &str = "/proc/uptime";

/// Source of the facts announced in each beacon.
/// Static values come from config; the rest is read fresh on every call.
pub struct HostInfo {
    config: AnnounceConfig,
    started: Instant,
}

impl HostInfo {
    pub fn new(config: AnnounceConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
        }
    }

    pub fn facts(&self) -> HostFacts {
        let identity = self.config.identity.clone().unwrap_or_else(hostname_or_default);

        HostFacts {
            mac_address: self.config.mac_address,
            identity,
            version: self.config.version.clone(),
            platform: self.config.platform.clone(),
            uptime: self.uptime(),
            software_id: self.config.software_id.clone(),
            board: self.config.board.clone(),
            ipv4_addresses: local_ipv4_addresses(),
        }
    }

    /// System uptime, or time since start if the kernel doesn't tell us
    fn uptime(&self) -> Duration {
        std::fs::read_to_string(PROC_UPTIME)
            .ok()
            .and_then(|contents| parse_proc_uptime(&contents))
            .unwrap_or_else(|| self.started.elapsed())
    }
}

fn hostname_or_default() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().to_string(),
        Err(e) => {
            tracing::warn!("Failed to get system hostname: {}", e);
            "n/a".to_string()
        }
    }
}

/// Parse the first field of /proc/uptime, e.g. "350735.47 234388.90"
fn parse_proc_uptime(contents: &str) -> Option<Duration> {
    let secs: f64 = contents.split_whitespace().next()?.parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Non-loopback IPv4 addresses of all interfaces
fn local_ipv4_addresses() -> Vec<Ipv4Addr> {
    match if_addrs::get_if_addrs() {
        Ok(ifaces) => ifaces
            .into_iter()
            .filter(|iface| !iface.is_loopback())
            .filter_map(|iface| match iface.addr.ip() {
                IpAddr::V4(addr) => Some(addr),
                IpAddr::V6(_) => None,
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to list network interfaces: {}", e);
            Vec::new()
        }
    }
}
