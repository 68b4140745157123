//! MNDP wire codec.
//!
//! Packets are a 4-byte header (2 reserved bytes, big-endian sequence number)
//! followed by TLV fields. See [`tlv`] for the per-field layout.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod mac;
pub mod tlv;

pub use decoder::{decode_packet, DecodedPacket, RawFields};
pub use encoder::{HostFacts, PacketEncoder};
pub use error::CodecError;
pub use mac::MacAddress;
pub use tlv::{decode_field, Field, FieldType, Uptime};
