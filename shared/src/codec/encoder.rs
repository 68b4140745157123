use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use crate::codec::error::CodecError;
use crate::codec::mac::MacAddress;
use crate::codec::tlv::{Field, Uptime};
use crate::protocol::{PACKET_HEADER_LEN, UNPACK_NONE};

/// Facts about the local host that go into a self-announcement.
/// Gathered by the caller; the encoder never inspects the system itself.
#[derive(Debug, Clone)]
pub struct HostFacts {
    pub mac_address: MacAddress,
    pub identity: String,
    pub version: String,
    pub platform: String,
    pub uptime: Duration,
    pub software_id: String,
    pub board: String,
    pub ipv4_addresses: Vec<Ipv4Addr>,
}

/// Builds announcement packets and owns the outgoing sequence number.
#[derive(Debug, Default)]
pub struct PacketEncoder {
    seq: AtomicU16,
}

impl PacketEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one announcement. Each call consumes one sequence number,
    /// starting at 0 and wrapping at `u16::MAX`.
    pub fn encode(&self, facts: &HostFacts) -> Result<Vec<u8>, CodecError> {
        // fetch_add wraps on overflow
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);

        let uptime_secs = u32::try_from(facts.uptime.as_secs()).unwrap_or(u32::MAX);
        let fields = [
            Field::MacAddress(facts.mac_address),
            Field::Identity(facts.identity.clone()),
            Field::Version(facts.version.clone()),
            Field::Platform(facts.platform.clone()),
            Field::Uptime(Uptime(uptime_secs)),
            Field::SoftwareId(facts.software_id.clone()),
            Field::Board(facts.board.clone()),
            Field::Unpack(UNPACK_NONE.to_vec()),
            Field::Ipv4Address(facts.ipv4_addresses.clone()),
        ];

        let mut packet = Vec::with_capacity(128);
        packet.extend_from_slice(&[0x00, 0x00]);
        packet.extend_from_slice(&seq.to_be_bytes());
        debug_assert_eq!(packet.len(), PACKET_HEADER_LEN);

        for field in &fields {
            field.write_to(&mut packet)?;
        }

        Ok(packet)
    }
}
