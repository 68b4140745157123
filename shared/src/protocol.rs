use std::net::Ipv4Addr;
use std::time::Duration;

/// UDP port used for both announcing and listening
pub const MNDP_PORT: u16 = 5678;

/// Announcements go to the limited broadcast address
pub const MNDP_BROADCAST_ADDR: Ipv4Addr = Ipv4Addr::BROADCAST;

/// Interval between self-announcements
pub const BEACON_INTERVAL: Duration = Duration::from_secs(10);

/// Reserved (2) + sequence number (2)
pub const PACKET_HEADER_LEN: usize = 4;

/// Reserved (1) + type (1) + length (2)
pub const FIELD_HEADER_LEN: usize = 4;

/// Receive buffer size, one Ethernet MTU
pub const RECV_BUFFER_LEN: usize = 1500;

/// Value sent in the unpack field of our own announcements
pub const UNPACK_NONE: &[u8] = b"0";

/// API paths
pub const API_DEVICES: &str = "/v1/devices";
pub const API_DEVICES_HASH: &str = "/v1/devices/hash";
pub const WS_PATH: &str = "/ws";
