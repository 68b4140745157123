use std::net::{Ipv4Addr, Ipv6Addr};
use crate::codec::mac::MacAddress;
use crate::codec::tlv::{decode_field, Field, Uptime};
use crate::protocol::{FIELD_HEADER_LEN, PACKET_HEADER_LEN};

/// Iterator over the raw `(type, value)` pairs of a packet body.
///
/// Stops at the first field whose header or declared value would run past
/// the end of the buffer. Whatever was yielded before that point stands.
pub struct RawFields<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> RawFields<'a> {
    pub fn new(packet: &'a [u8]) -> Self {
        Self { buf: packet, offset: PACKET_HEADER_LEN }
    }
}

impl<'a> Iterator for RawFields<'a> {
    type Item = (u8, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let header_end = self.offset.checked_add(FIELD_HEADER_LEN)?;
        if header_end > self.buf.len() {
            return None;
        }

        // byte 0 of the type slot is reserved
        let tag = self.buf[self.offset + 1];
        let len = u16::from_be_bytes([self.buf[self.offset + 2], self.buf[self.offset + 3]]) as usize;

        let value_end = header_end + len;
        if value_end > self.buf.len() {
            self.offset = self.buf.len();
            return None;
        }

        let value = &self.buf[header_end..value_end];
        self.offset = value_end;
        Some((tag, value))
    }
}

/// Everything recognised in one announcement.
///
/// A missing `mac_address` means the packet cannot be attributed to a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedPacket {
    pub sequence: Option<u16>,
    pub mac_address: Option<MacAddress>,
    pub identity: Option<String>,
    pub version: Option<String>,
    pub platform: Option<String>,
    pub uptime: Option<Uptime>,
    pub software_id: Option<String>,
    pub board: Option<String>,
    pub unpack: Option<Vec<u8>>,
    pub ipv6_address: Option<Ipv6Addr>,
    pub interface_name: Option<String>,
    pub ipv4_addresses: Option<Vec<Ipv4Addr>>,
}

impl DecodedPacket {
    /// Store a field, replacing any earlier field of the same type.
    pub fn apply(&mut self, field: Field) {
        match field {
            Field::MacAddress(mac) => self.mac_address = Some(mac),
            Field::Identity(text) => self.identity = Some(text),
            Field::Version(text) => self.version = Some(text),
            Field::Platform(text) => self.platform = Some(text),
            Field::Uptime(uptime) => self.uptime = Some(uptime),
            Field::SoftwareId(text) => self.software_id = Some(text),
            Field::Board(text) => self.board = Some(text),
            Field::Unpack(bytes) => self.unpack = Some(bytes),
            Field::Ipv6Address(addr) => self.ipv6_address = Some(addr),
            Field::InterfaceName(text) => self.interface_name = Some(text),
            Field::Ipv4Address(addrs) => self.ipv4_addresses = Some(addrs),
        }
    }
}

/// Decode an inbound datagram. Never fails; truncated or malformed input
/// just yields fewer fields.
pub fn decode_packet(packet: &[u8]) -> DecodedPacket {
    let mut decoded = DecodedPacket {
        sequence: packet
            .get(2..PACKET_HEADER_LEN)
            .map(|seq| u16::from_be_bytes([seq[0], seq[1]])),
        ..Default::default()
    };

    for field in RawFields::new(packet).filter_map(|(tag, value)| decode_field(tag, value)) {
        decoded.apply(field);
    }

    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::codec::encoder::{HostFacts, PacketEncoder};

    fn sample_packet() -> Vec<u8> {
        let facts = HostFacts {
            mac_address: "b8:27:eb:e0:dc:e8".parse().unwrap(),
            identity: "node1".to_string(),
            version: "0.0.2".to_string(),
            platform: "MikroTik".to_string(),
            uptime: Duration::from_secs(5),
            software_id: "SHT1-SHT2".to_string(),
            board: "RPI-3".to_string(),
            ipv4_addresses: vec![Ipv4Addr::new(192, 168, 1, 10)],
        };
        PacketEncoder::new().encode(&facts).unwrap()
    }

    #[test]
    fn test_decode_own_announcement() {
        let decoded = decode_packet(&sample_packet());

        assert_eq!(decoded.sequence, Some(0));
        assert_eq!(decoded.identity.as_deref(), Some("node1"));
        assert_eq!(
            decoded.mac_address.map(|mac| mac.to_string()).as_deref(),
            Some("B8:27:EB:E0:DC:E8")
        );
        assert_eq!(
            decoded.uptime.map(|uptime| uptime.to_string()).as_deref(),
            Some("0 days, 00:00:05")
        );
        assert_eq!(decoded.version.as_deref(), Some("0.0.2"));
        assert_eq!(decoded.platform.as_deref(), Some("MikroTik"));
        assert_eq!(decoded.software_id.as_deref(), Some("SHT1-SHT2"));
        assert_eq!(decoded.board.as_deref(), Some("RPI-3"));
        assert_eq!(decoded.unpack.as_deref(), Some(&b"0"[..]));
        assert_eq!(decoded.ipv4_addresses, Some(vec![Ipv4Addr::new(192, 168, 1, 10)]));
        assert!(decoded.ipv6_address.is_none());
        assert!(decoded.interface_name.is_none());
    }

    #[test]
    fn test_truncation_at_every_offset() {
        let packet = sample_packet();
        let full = decode_packet(&packet);

        let mut previous = 0;
        for cut in 0..=packet.len() {
            let raw_count = RawFields::new(&packet[..cut]).count();
            assert!(raw_count >= previous, "field count went backwards at {cut}");
            previous = raw_count;

            // no partial field may ever decode to a wrong value
            let partial = decode_packet(&packet[..cut]);
            if let Some(identity) = &partial.identity {
                assert_eq!(Some(identity), full.identity.as_ref());
            }
            if let Some(mac) = &partial.mac_address {
                assert_eq!(Some(mac), full.mac_address.as_ref());
            }
        }
        assert_eq!(previous, 9);
    }

    #[test]
    fn test_short_buffers() {
        assert_eq!(decode_packet(&[]), DecodedPacket::default());
        assert_eq!(decode_packet(&[0x00, 0x00, 0x00]).sequence, None);

        let header_only = decode_packet(&[0x00, 0x00, 0x12, 0x34]);
        assert_eq!(header_only.sequence, Some(0x1234));
        assert!(header_only.mac_address.is_none());
    }

    #[test]
    fn test_declared_length_past_end_stops() {
        let mut packet = vec![0x00, 0x00, 0x00, 0x07];
        packet.extend_from_slice(&[0x00, 0x05, 0x00, 0x04]);
        packet.extend_from_slice(b"abcd");
        packet.extend_from_slice(&[0x00, 0x01, 0x00, 0x40]);
        packet.extend_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);

        let decoded = decode_packet(&packet);
        assert_eq!(decoded.identity.as_deref(), Some("abcd"));
        assert!(decoded.mac_address.is_none());
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let mut packet = vec![0x00, 0x00, 0x00, 0x00];
        packet.extend_from_slice(&[0x00, 0x63, 0x00, 0x03, 1, 2, 3]);
        packet.extend_from_slice(&[0x00, 0x10, 0x00, 0x05]);
        packet.extend_from_slice(b"ether");

        let decoded = decode_packet(&packet);
        assert_eq!(decoded.interface_name.as_deref(), Some("ether"));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let mut packet = vec![0x00, 0x00, 0x00, 0x00];
        packet.extend_from_slice(&[0x00, 0x05, 0x00, 0x03]);
        packet.extend_from_slice(b"old");
        packet.extend_from_slice(&[0x00, 0x05, 0x00, 0x03]);
        packet.extend_from_slice(b"new");

        assert_eq!(decode_packet(&packet).identity.as_deref(), Some("new"));
    }

    #[test]
    fn test_zero_length_field() {
        let mut packet = vec![0x00, 0x00, 0x00, 0x00];
        packet.extend_from_slice(&[0x00, 0x0c, 0x00, 0x00]);
        packet.extend_from_slice(&[0x00, 0x08, 0x00, 0x02]);
        packet.extend_from_slice(b"RB");

        let decoded = decode_packet(&packet);
        assert_eq!(decoded.board.as_deref(), Some(""));
        assert_eq!(decoded.platform.as_deref(), Some("RB"));
    }

    #[test]
    fn test_malformed_mac_is_dropped() {
        let mut packet = vec![0x00, 0x00, 0x00, 0x00];
        packet.extend_from_slice(&[0x00, 0x01, 0x00, 0x04, 0xaa, 0xbb, 0xcc, 0xdd]);

        assert!(decode_packet(&packet).mac_address.is_none());
    }
}
