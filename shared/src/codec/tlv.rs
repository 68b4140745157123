//! Single-field TLV encoding.
//!
//! Wire layout of one field:
//!
//! ```text
//! [reserved: 1][type: 1][length: 2, big-endian][value: length bytes]
//! ```
//!
//! The reserved byte is always written as zero and ignored on read.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use crate::codec::error::CodecError;
use crate::codec::mac::MacAddress;
use crate::protocol::FIELD_HEADER_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldType {
    MacAddress = 1,
    Identity = 5,
    Version = 7,
    Platform = 8,
    Uptime = 10,
    SoftwareId = 11,
    Board = 12,
    Unpack = 14,
    Ipv6Address = 15,
    InterfaceName = 16,
    Ipv4Address = 17,
}

impl FieldType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        let field_type = match tag {
            1 => Self::MacAddress,
            5 => Self::Identity,
            7 => Self::Version,
            8 => Self::Platform,
            10 => Self::Uptime,
            11 => Self::SoftwareId,
            12 => Self::Board,
            14 => Self::Unpack,
            15 => Self::Ipv6Address,
            16 => Self::InterfaceName,
            17 => Self::Ipv4Address,
            _ => return None,
        };
        Some(field_type)
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// Device uptime in whole seconds.
///
/// Carried on the wire as a little-endian `u32`, unlike every other
/// multi-byte integer in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Uptime(pub u32);

impl Uptime {
    pub fn as_secs(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0;
        let days = secs / 86_400;
        let hours = (secs % 86_400) / 3_600;
        let minutes = (secs % 3_600) / 60;
        let seconds = secs % 60;
        write!(f, "{days} days, {hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// One decoded protocol attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    MacAddress(MacAddress),
    Identity(String),
    Version(String),
    Platform(String),
    Uptime(Uptime),
    SoftwareId(String),
    Board(String),
    /// Raw flag bytes, only ever shown as hex
    Unpack(Vec<u8>),
    Ipv6Address(Ipv6Addr),
    InterfaceName(String),
    /// One or more addresses, packed as consecutive 4-byte groups
    Ipv4Address(Vec<Ipv4Addr>),
}

impl Field {
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::MacAddress(_) => FieldType::MacAddress,
            Self::Identity(_) => FieldType::Identity,
            Self::Version(_) => FieldType::Version,
            Self::Platform(_) => FieldType::Platform,
            Self::Uptime(_) => FieldType::Uptime,
            Self::SoftwareId(_) => FieldType::SoftwareId,
            Self::Board(_) => FieldType::Board,
            Self::Unpack(_) => FieldType::Unpack,
            Self::Ipv6Address(_) => FieldType::Ipv6Address,
            Self::InterfaceName(_) => FieldType::InterfaceName,
            Self::Ipv4Address(_) => FieldType::Ipv4Address,
        }
    }

    fn value_bytes(&self) -> Vec<u8> {
        match self {
            Self::MacAddress(mac) => mac.octets().to_vec(),
            Self::Identity(text)
            | Self::Version(text)
            | Self::Platform(text)
            | Self::SoftwareId(text)
            | Self::Board(text)
            | Self::InterfaceName(text) => text.as_bytes().to_vec(),
            Self::Uptime(uptime) => uptime.as_secs().to_le_bytes().to_vec(),
            Self::Unpack(bytes) => bytes.clone(),
            Self::Ipv6Address(addr) => addr.octets().to_vec(),
            Self::Ipv4Address(addrs) => addrs.iter().flat_map(|addr| addr.octets()).collect(),
        }
    }

    /// Append the full TLV (header and value) to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) -> Result<(), CodecError> {
        let value = self.value_bytes();
        let tag = self.field_type().tag();
        let len = u16::try_from(value.len())
            .map_err(|_| CodecError::FieldTooLong { field_type: tag, len: value.len() })?;

        buf.reserve(FIELD_HEADER_LEN + value.len());
        buf.push(0x00);
        buf.push(tag);
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(&value);
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacAddress(mac) => write!(f, "{mac}"),
            Self::Identity(text)
            | Self::Version(text)
            | Self::Platform(text)
            | Self::SoftwareId(text)
            | Self::Board(text)
            | Self::InterfaceName(text) => f.write_str(text),
            Self::Uptime(uptime) => write!(f, "{uptime}"),
            Self::Unpack(bytes) => f.write_str(&hex::encode(bytes)),
            Self::Ipv6Address(addr) => {
                let groups: Vec<String> = addr.segments().iter().map(|g| format!("{g:04X}")).collect();
                f.write_str(&groups.join(":"))
            }
            Self::Ipv4Address(addrs) => {
                let joined: Vec<String> = addrs.iter().map(|addr| addr.to_string()).collect();
                f.write_str(&joined.join(", "))
            }
        }
    }
}

/// Decode a single field value.
///
/// Returns `None` for unknown tags and for payloads whose length cannot be
/// valid for the field type. Neither case is an error: the caller skips the
/// field and carries on with the rest of the packet.
pub fn decode_field(tag: u8, value: &[u8]) -> Option<Field> {
    let text = || String::from_utf8_lossy(value).into_owned();

    let field = match FieldType::from_tag(tag)? {
        FieldType::MacAddress => Field::MacAddress(MacAddress::from_bytes(value)?),
        FieldType::Identity => Field::Identity(text()),
        FieldType::Version => Field::Version(text()),
        FieldType::Platform => Field::Platform(text()),
        FieldType::Uptime => {
            let raw = <[u8; 4]>::try_from(value).ok()?;
            Field::Uptime(Uptime(u32::from_le_bytes(raw)))
        }
        FieldType::SoftwareId => Field::SoftwareId(text()),
        FieldType::Board => Field::Board(text()),
        FieldType::Unpack => Field::Unpack(value.to_vec()),
        FieldType::Ipv6Address => {
            let raw = <[u8; 16]>::try_from(value).ok()?;
            Field::Ipv6Address(Ipv6Addr::from(raw))
        }
        FieldType::InterfaceName => Field::InterfaceName(text()),
        FieldType::Ipv4Address => {
            if value.len() % 4 != 0 {
                return None;
            }
            let addrs = value
                .chunks_exact(4)
                .map(|octets| Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]))
                .collect();
            Field::Ipv4Address(addrs)
        }
    };

    Some(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(field: Field) {
        let encoded = field.encode().unwrap();
        assert_eq!(encoded[0], 0x00);
        assert_eq!(encoded[1], field.field_type().tag());
        let len = u16::from_be_bytes([encoded[2], encoded[3]]) as usize;
        assert_eq!(len, encoded.len() - FIELD_HEADER_LEN);

        let decoded = decode_field(encoded[1], &encoded[FIELD_HEADER_LEN..]);
        assert_eq!(decoded, Some(field));
    }

    #[test]
    fn test_encoder_supported_types_roundtrip() {
        roundtrip(Field::MacAddress("b8:27:eb:e0:dc:e8".parse().unwrap()));
        roundtrip(Field::Identity("node1".to_string()));
        roundtrip(Field::Version("0.0.2".to_string()));
        roundtrip(Field::Platform("MikroTik".to_string()));
        roundtrip(Field::Uptime(Uptime(93_784)));
        roundtrip(Field::SoftwareId("SHT1-SHT2".to_string()));
        roundtrip(Field::Board("RPI-3".to_string()));
        roundtrip(Field::Unpack(b"0".to_vec()));
        roundtrip(Field::Ipv4Address(vec![Ipv4Addr::new(192, 168, 1, 10)]));
    }

    #[test]
    fn test_mac_decodes_to_uppercase_colon_text() {
        let field = decode_field(1, &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]).unwrap();
        assert_eq!(field.to_string(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_uptime_is_little_endian() {
        let field = decode_field(10, &[0x0A, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(field, Field::Uptime(Uptime(10)));
        assert_eq!(field.to_string(), "0 days, 00:00:10");

        let encoded = Field::Uptime(Uptime(10)).encode().unwrap();
        assert_eq!(&encoded[4..], &[0x0A, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_uptime_formatting() {
        assert_eq!(Uptime(0).to_string(), "0 days, 00:00:00");
        assert_eq!(Uptime(93_784).to_string(), "1 days, 02:03:04");
        assert_eq!(Uptime(u32::MAX).to_string(), "49710 days, 06:28:15");
    }

    #[test]
    fn test_ipv4_decodes_to_dotted_text() {
        let field = decode_field(17, &[192, 168, 1, 10]).unwrap();
        assert_eq!(field.to_string(), "192.168.1.10");
    }

    #[test]
    fn test_ipv4_list() {
        let field = decode_field(17, &[192, 168, 1, 10, 10, 0, 0, 2]).unwrap();
        assert_eq!(field.to_string(), "192.168.1.10, 10.0.0.2");
        assert!(decode_field(17, &[192, 168, 1]).is_none());
    }

    #[test]
    fn test_ipv6_groups() {
        let mut raw = [0u8; 16];
        raw[0] = 0xfe;
        raw[1] = 0x80;
        raw[15] = 0x01;
        let field = decode_field(15, &raw).unwrap();
        assert_eq!(field.to_string(), "FE80:0000:0000:0000:0000:0000:0000:0001");
    }

    #[test]
    fn test_ipv6_rejects_wrong_length() {
        assert!(decode_field(15, &[0xfe, 0x80, 0x00]).is_none());
        assert!(decode_field(15, &[0u8; 8]).is_none());
    }

    #[test]
    fn test_unpack_is_hex() {
        let field = decode_field(14, b"0").unwrap();
        assert_eq!(field.to_string(), "30");
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        assert!(decode_field(2, b"anything").is_none());
        assert!(decode_field(255, &[]).is_none());
    }

    #[test]
    fn test_invalid_utf8_text_is_lossy() {
        let field = decode_field(5, &[b'a', 0xff, b'b']).unwrap();
        assert_eq!(field, Field::Identity("a\u{fffd}b".to_string()));
    }

    #[test]
    fn test_field_too_long() {
        let field = Field::Identity("x".repeat(u16::MAX as usize + 1));
        assert_eq!(
            field.encode(),
            Err(CodecError::FieldTooLong { field_type: 5, len: u16::MAX as usize + 1 })
        );
    }

    #[test]
    fn test_field_type_tags() {
        for tag in 0..=u8::MAX {
            if let Some(field_type) = FieldType::from_tag(tag) {
                assert_eq!(field_type.tag(), tag);
            }
        }
        assert_eq!(FieldType::from_tag(16), Some(FieldType::InterfaceName));
        assert_eq!(FieldType::from_tag(2), None);
    }
}
