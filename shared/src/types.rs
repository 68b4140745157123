use std::collections::BTreeMap;
use std::net::IpAddr;
use chrono::{DateTime, Local, Utc};
use serde::{Serialize, Deserialize};
use crate::codec::{DecodedPacket, Field, MacAddress};

/// A device seen on the network.
/// This is the canonical data model used by the registry, API, and dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Hardware address from the announcement; the registry key
    pub source_mac: MacAddress,

    /// Transport-layer source of the announcement
    pub sender_ip: IpAddr,

    /// Local time of day the announcement arrived, e.g. "14:03:27"
    pub observed_at: String,

    /// Same instant as `observed_at`, full timestamp
    pub last_seen: DateTime<Utc>,

    /// Device identity (system name)
    pub identity: Option<String>,

    pub version: Option<String>,
    pub platform: Option<String>,
    pub software_id: Option<String>,
    pub board: Option<String>,
    pub interface_name: Option<String>,

    /// Self-reported IPv4 address(es), dotted decimal
    pub ipv4_address: Option<String>,

    /// Self-reported IPv6 address, eight full hex groups
    pub ipv6_address: Option<String>,

    /// Formatted as "D days, HH:MM:SS"
    pub uptime: Option<String>,
}

/// Point-in-time copy of the registry, keyed by hardware address.
pub type DeviceSnapshot = BTreeMap<MacAddress, DeviceRecord>;

impl DeviceRecord {
    /// Build a record from a decoded announcement.
    ///
    /// Returns `None` if the packet carries no hardware address.
    pub fn from_announcement(packet: DecodedPacket, sender_ip: IpAddr, seen: DateTime<Local>) -> Option<Self> {
        let source_mac = packet.mac_address?;

        let ipv4_address = packet
            .ipv4_addresses
            .filter(|addrs| !addrs.is_empty())
            .map(|addrs| Field::Ipv4Address(addrs).to_string());

        Some(Self {
            source_mac,
            sender_ip,
            observed_at: seen.format("%H:%M:%S").to_string(),
            last_seen: seen.with_timezone(&Utc),
            identity: packet.identity,
            version: packet.version,
            platform: packet.platform,
            software_id: packet.software_id,
            board: packet.board,
            interface_name: packet.interface_name,
            ipv4_address,
            ipv6_address: packet.ipv6_address.map(|addr| Field::Ipv6Address(addr).to_string()),
            uptime: packet.uptime.map(|uptime| uptime.to_string()),
        })
    }
}
